//! Cooperative scheduling: interruption between units, commit atomicity,
//! last-caller-wins renders.

mod common;

use common::{drive, Call, Exhausted, NodeId, RecordingTree};
use weft::{Element, Props, Reconciler};

fn wide_tree(tag: &str) -> Element {
	Element::host(
		"div",
		Props::new(),
		vec![
			Element::host(tag, Props::new(), vec![Element::text("a")]),
			Element::host(tag, Props::new(), vec![Element::text("b")]),
			Element::host(tag, Props::new(), vec![Element::text("c")]),
		],
	)
}

#[test]
fn interrupted_build_leaves_the_output_tree_untouched() {
	let mut host = RecordingTree::new();
	let mut reconciler = Reconciler::new();

	reconciler.render(wide_tree("span"), RecordingTree::container());

	// Step unit by unit under a spent budget. Until the pass finishes, the
	// host may see detached-node setup but no structural mutation: an
	// observer of the container cannot tell a render is underway.
	let mut steps = 0;
	while reconciler.has_pending_work() {
		let structural_before_commit = host.calls.iter().any(Call::is_structural);
		assert!(
			!structural_before_commit,
			"structural mutation escaped before commit, after {} step(s)",
			steps
		);
		reconciler.work_loop(&mut host, &Exhausted);
		steps += 1;
	}

	// The finishing invocation committed everything at once.
	let appended = host
		.take_calls()
		.iter()
		.filter(|call| call.is_structural())
		.count();
	assert_eq!(appended, 7, "one insertion per element node");
}

#[test]
fn commit_happens_in_the_invocation_that_runs_out_of_units() {
	let mut host = RecordingTree::new();
	let mut reconciler = Reconciler::new();

	reconciler.render(
		Element::host("p", Props::new(), vec![]),
		RecordingTree::container(),
	);

	// Two units: the container root and the single element.
	reconciler.work_loop(&mut host, &Exhausted);
	assert!(reconciler.has_pending_work());
	reconciler.work_loop(&mut host, &Exhausted);
	assert!(!reconciler.has_pending_work());

	assert!(host.take_calls().contains(&Call::AppendChild {
		parent: RecordingTree::container(),
		child: NodeId(1),
	}));
}

#[test]
fn rerender_before_commit_discards_the_unfinished_pass() {
	let mut host = RecordingTree::new();
	let mut reconciler = Reconciler::new();

	reconciler.render(wide_tree("span"), RecordingTree::container());
	reconciler.work_loop(&mut host, &Exhausted);
	reconciler.work_loop(&mut host, &Exhausted);
	assert!(reconciler.has_pending_work());

	// Last caller wins: the half-built span tree is abandoned wholesale and
	// never reaches the output tree.
	reconciler.render(wide_tree("em"), RecordingTree::container());
	drive(&mut reconciler, &mut host);

	let calls = host.take_calls();
	assert!(!calls
		.iter()
		.any(|call| matches!(call, Call::AppendChild { child, .. }
			if calls.iter().any(|created| matches!(created, Call::CreateNode { node, tag }
				if node == child && tag.as_str() == "span")))),
		"no node from the abandoned pass may be inserted");

	let em_insertions = calls
		.iter()
		.filter(|call| call.is_structural())
		.count();
	assert_eq!(em_insertions, 7);
}

#[test]
fn work_loop_without_pending_work_is_harmless() {
	let mut host = RecordingTree::new();
	let mut reconciler = Reconciler::new();

	reconciler.render(wide_tree("span"), RecordingTree::container());
	drive(&mut reconciler, &mut host);
	host.take_calls();

	// The host idle loop keeps invoking forever; idle invocations must not
	// re-commit or otherwise disturb anything.
	reconciler.work_loop(&mut host, &Exhausted);
	reconciler.work_loop(&mut host, &common::Unlimited);
	assert_eq!(host.take_calls(), vec![]);
}
