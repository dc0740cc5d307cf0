//! The reconciliation engine: dual fiber trees, the cooperative work loop,
//! positional child diffing and the non-interruptible commit phase.

use crate::diff::apply_property_delta;
use crate::element::{Element, Props, Tag};
use crate::fiber::{Effect, Fiber, FiberArena, FiberKey};
use crate::host::{Deadline, OutputTree};
use tracing::{error, info, instrument, trace, trace_span};

/// Budget below which the work loop yields back to the host scheduler.
const YIELD_BUDGET_MS: f64 = 1.0;

/// An incremental reconciler bound to one output tree type.
///
/// All engine state — the committed tree, the work-in-progress tree, the
/// pending unit of work and the deletion set — lives on the instance, so
/// independent reconcilers can coexist and tests need no global reset.
///
/// There is exactly one thread of control: the host invokes
/// [`work_loop`](Self::work_loop) repeatedly, and execution only ever
/// suspends between units of work. The discipline that substitutes for
/// locking is that the committed tree is mutated nowhere but inside the
/// commit pass, and the work-in-progress tree is never visible outside it.
pub struct Reconciler<H: OutputTree> {
	arena: FiberArena<H::Node>,
	/// Root of the last fully committed tree.
	current: Option<FiberKey>,
	/// Root of the tree being built, between `render` and its commit.
	wip_root: Option<FiberKey>,
	next_unit: Option<FiberKey>,
	/// Old-tree fibers with no counterpart in the new child lists, in
	/// discovery order. Consumed exactly once per commit.
	deletions: Vec<FiberKey>,
}

impl<H: OutputTree> Default for Reconciler<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H: OutputTree> Reconciler<H> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			arena: FiberArena::new(),
			current: None,
			wip_root: None,
			next_unit: None,
			deletions: Vec::new(),
		}
	}

	/// Seeds a render pass: a fresh work-in-progress root whose output node
	/// is `container` and whose single pending child is `element`.
	///
	/// Nothing is mutated synchronously; the pass runs across subsequent
	/// [`work_loop`](Self::work_loop) invocations. Calling `render` again
	/// before the previous pass commits discards that pass wholesale —
	/// last caller wins, uncommitted work is never merged.
	#[instrument(skip(self, element, container))]
	pub fn render(&mut self, element: Element, container: H::Node) {
		if let Some(stale) = self.wip_root.take() {
			trace!("Discarding uncommitted work-in-progress tree.");
			self.arena.free_subtree(stale);
		}
		self.deletions.clear();

		let wip = self.arena.insert(Fiber {
			tag: None,
			props: Props::default(),
			children: vec![element],
			output: Some(container),
			parent: None,
			child: None,
			sibling: None,
			alternate: self.current,
			effect: Effect::None,
		});
		self.wip_root = Some(wip);
		self.next_unit = Some(wip);
	}

	/// Whether a render pass is underway (pending units or an uncommitted
	/// work-in-progress tree). Hosts with smarter idle scheduling can use
	/// this to skip no-op invocations; calling [`work_loop`](Self::work_loop)
	/// without pending work is harmless either way.
	#[must_use]
	pub fn has_pending_work(&self) -> bool {
		self.next_unit.is_some() || self.wip_root.is_some()
	}

	/// One invocation of the cooperative driver, to be called by the host's
	/// idle primitive with its remaining time budget — repeatedly, forever.
	///
	/// Performs units of work until the budget drops under a millisecond,
	/// then yields. At least one unit runs per invocation, so starvation
	/// under a stingy budget is impossible. Once no unit remains, the
	/// finished tree is committed in full within the same invocation: commit
	/// never yields, because the output tree must not be observable in a
	/// half-updated state.
	pub fn work_loop(&mut self, host: &mut H, deadline: &impl Deadline) {
		let mut should_yield = false;
		while !should_yield {
			match self.next_unit {
				Some(unit) => {
					self.next_unit = self.perform_unit_of_work(host, unit);
					should_yield = deadline.time_remaining() < YIELD_BUDGET_MS;
				}
				None => break,
			}
		}

		if self.next_unit.is_none() && self.wip_root.is_some() {
			self.commit_root(host);
		}
	}

	/// Expands one fiber: materializes its output node on first visit, then
	/// reconciles its pending child elements into child fibers.
	///
	/// Returns the next unit in depth-first order — the first child if one
	/// was produced, otherwise the nearest ancestor's unvisited sibling via
	/// an explicit parent walk-back. The walk-back is intentional: keeping
	/// traversal state in the fiber links rather than on the call stack is
	/// what makes yielding between units possible.
	#[instrument(skip(self, host))]
	fn perform_unit_of_work(&mut self, host: &mut H, key: FiberKey) -> Option<FiberKey> {
		if self.arena[key].output.is_none() {
			let output = self.create_output(host, key);
			self.arena[key].output = Some(output);
		}

		let children = core::mem::take(&mut self.arena[key].children);
		self.reconcile_children(key, children);

		if let Some(child) = self.arena[key].child {
			return Some(child);
		}
		let mut cursor = Some(key);
		while let Some(k) = cursor {
			if let Some(sibling) = self.arena[k].sibling {
				return Some(sibling);
			}
			cursor = self.arena[k].parent;
		}
		None
	}

	/// Creates the output node for a fresh fiber and applies its initial
	/// props against an empty baseline.
	fn create_output(&self, host: &mut H, key: FiberKey) -> H::Node {
		let fiber = &self.arena[key];
		let node = match &fiber.tag {
			Some(Tag::Text) => host.create_text_node(),
			Some(Tag::Host(name)) => host.create_node(name),
			None => {
				error!("Asked to create an output node for a container root.");
				panic!("internal consistency fault: container roots arrive with an output node")
			}
		};
		apply_property_delta(host, &node, &Props::default(), &fiber.props);
		node
	}

	/// Walks the old child chain and the new element list in positional
	/// lock-step, matching purely by tag equality.
	///
	/// Same tag at the same index reuses the old fiber's output node under
	/// the new props (`Update`); a present element without a matching old
	/// fiber becomes a `Placement`; a present old fiber without a matching
	/// element joins the deletion set. Both cursors advance one position per
	/// iteration, so a shorter new list routes every surplus old fiber to
	/// deletion and a longer one places every excess element — no old child
	/// is ever silently dropped.
	fn reconcile_children(&mut self, parent: FiberKey, elements: Vec<Element>) {
		let span = trace_span!("reconcile_children", ?parent, new_len = elements.len());
		let _enter = span.enter();

		let mut old = self.arena[parent]
			.alternate
			.and_then(|alternate| self.arena[alternate].child);
		let mut elements = elements.into_iter();
		let mut next_element = elements.next();
		let mut prev_sibling: Option<FiberKey> = None;

		while next_element.is_some() || old.is_some() {
			let mut new_fiber = None;

			match (next_element.take(), old) {
				(Some(element), Some(old_key))
					if self.arena[old_key].tag.as_ref() == Some(element.tag()) =>
				{
					let (tag, props, children) = element.into_parts();
					let output = self.arena[old_key].output.clone();
					new_fiber = Some(self.arena.insert(Fiber {
						tag: Some(tag),
						props,
						children,
						output,
						parent: Some(parent),
						child: None,
						sibling: None,
						alternate: Some(old_key),
						effect: Effect::Update,
					}));
				}
				(element, old_key) => {
					if let Some(element) = element {
						let (tag, props, children) = element.into_parts();
						new_fiber = Some(self.arena.insert(Fiber {
							tag: Some(tag),
							props,
							children,
							output: None,
							parent: Some(parent),
							child: None,
							sibling: None,
							alternate: None,
							effect: Effect::Placement,
						}));
					}
					if let Some(old_key) = old_key {
						self.arena[old_key].effect = Effect::Deletion;
						self.deletions.push(old_key);
					}
				}
			}

			if let Some(old_key) = old {
				old = self.arena[old_key].sibling;
			}
			next_element = elements.next();

			if new_fiber.is_some() {
				match prev_sibling {
					None => self.arena[parent].child = new_fiber,
					Some(prev) => self.arena[prev].sibling = new_fiber,
				}
				prev_sibling = new_fiber;
			}
		}
	}

	/// The non-interruptible commit pass: deletions first, then a pre-order
	/// walk of the finished tree applying placements and property deltas,
	/// then promotion of the work-in-progress tree to current.
	#[instrument(skip(self, host))]
	fn commit_root(&mut self, host: &mut H) {
		let wip = match self.wip_root.take() {
			Some(wip) => wip,
			None => return,
		};

		let deletions = core::mem::take(&mut self.deletions);
		let deleted = deletions.len();
		for key in deletions {
			self.commit_deletion(host, key);
		}

		let mut placed = 0_usize;
		let mut updated = 0_usize;
		let mut next = self.arena[wip].child;
		while let Some(key) = next {
			match self.arena[key].effect {
				Effect::Placement => placed += 1,
				Effect::Update => updated += 1,
				Effect::None | Effect::Deletion => {}
			}
			self.commit_work(host, key);
			next = self.next_committed(wip, key);
		}

		// The just-built tree becomes the baseline for the next render; the
		// previous baseline, which owns every deleted fiber, is released.
		if let Some(previous) = self.current.replace(wip) {
			self.arena.free_subtree(previous);
		}

		info!(
			"Committed {} placement(s), {} update(s), {} deletion(s); {} live fiber(s).",
			placed,
			updated,
			deleted,
			self.arena.len()
		);
	}

	/// Removes one deleted fiber's output node from its nearest materialized
	/// ancestor. Descendants of the deleted node go with it; they are never
	/// visited individually.
	fn commit_deletion(&mut self, host: &mut H, key: FiberKey) {
		let span = trace_span!("commit_deletion", ?key);
		let _enter = span.enter();

		let output = match self.arena[key].output.clone() {
			Some(output) => output,
			None => {
				error!("Fiber reached commit tagged for deletion without an output node.");
				panic!("internal consistency fault: deletion without an output node")
			}
		};
		let parent_output = self.nearest_output_ancestor(self.arena[key].parent);
		host.remove_child(&parent_output, &output);
	}

	/// Applies one committed fiber's effect and releases its links into the
	/// old tree.
	fn commit_work(&mut self, host: &mut H, key: FiberKey) {
		match self.arena[key].effect {
			Effect::Placement => {
				if let Some(output) = self.arena[key].output.clone() {
					let parent_output = self.nearest_output_ancestor(self.arena[key].parent);
					host.append_child(&parent_output, &output);
				}
			}
			Effect::Update => {
				let output = match self.arena[key].output.clone() {
					Some(output) => output,
					None => {
						error!("Fiber reached commit tagged for update without an output node.");
						panic!("internal consistency fault: update without an output node")
					}
				};
				match self.arena[key].alternate {
					Some(alternate) => {
						let arena = &self.arena;
						apply_property_delta(host, &output, &arena[alternate].props, &arena[key].props);
					}
					None => {
						error!("Update fiber has no alternate to diff against.");
						panic!("internal consistency fault: update without an alternate")
					}
				}
			}
			Effect::Deletion => {
				// Deletion fibers are never linked into the new tree.
				error!("Deletion fiber reached the main commit walk.");
				panic!("internal consistency fault: deletion fiber linked into the committed tree")
			}
			Effect::None => {}
		}

		// The old tree is about to be released; keep no links into it.
		let fiber = &mut self.arena[key];
		fiber.alternate = None;
		fiber.effect = Effect::None;
	}

	/// Pre-order successor within the committed tree: child, else sibling,
	/// else the nearest ancestor's sibling, stopping at the tree root.
	fn next_committed(&self, root: FiberKey, key: FiberKey) -> Option<FiberKey> {
		if let Some(child) = self.arena[key].child {
			return Some(child);
		}
		let mut cursor = Some(key);
		while let Some(k) = cursor {
			if k == root {
				return None;
			}
			if let Some(sibling) = self.arena[k].sibling {
				return Some(sibling);
			}
			cursor = self.arena[k].parent;
		}
		None
	}

	/// The output node of the nearest ancestor that has one. Placement and
	/// deletion targets always resolve: the container root is materialized
	/// from the first `render` on.
	fn nearest_output_ancestor(&self, mut from: Option<FiberKey>) -> H::Node {
		while let Some(key) = from {
			if let Some(output) = &self.arena[key].output {
				return output.clone();
			}
			from = self.arena[key].parent;
		}
		error!("No materialized ancestor found while committing.");
		panic!("internal consistency fault: no materialized ancestor")
	}
}
