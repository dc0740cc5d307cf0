#![allow(dead_code)]

//! A recording output tree: hands out numbered node handles and logs every
//! mutation in call order, so tests can assert on the exact mutation
//! sequence a render pass produced.

use weft::{Deadline, EventHandler, OutputTree, Reconciler, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
	CreateNode { node: NodeId, tag: String },
	CreateTextNode { node: NodeId },
	SetProperty { node: NodeId, name: String, value: Value },
	ClearProperty { node: NodeId, name: String },
	AddEvent { node: NodeId, event: String, handler: EventHandler },
	RemoveEvent { node: NodeId, event: String, handler: EventHandler },
	AppendChild { parent: NodeId, child: NodeId },
	RemoveChild { parent: NodeId, child: NodeId },
}

impl Call {
	/// Whether this mutation touches tree structure (and is therefore
	/// observable through the container), as opposed to configuring a
	/// still-detached node.
	pub fn is_structural(&self) -> bool {
		matches!(self, Call::AppendChild { .. } | Call::RemoveChild { .. })
	}
}

pub struct RecordingTree {
	next_id: u32,
	pub calls: Vec<Call>,
}

impl RecordingTree {
	pub fn new() -> Self {
		let _ = tracing_subscriber::fmt().with_test_writer().try_init();
		Self {
			next_id: 1,
			calls: Vec::new(),
		}
	}

	/// The pre-existing output root that `render` targets; never created by
	/// the reconciler.
	pub fn container() -> NodeId {
		NodeId(0)
	}

	pub fn take_calls(&mut self) -> Vec<Call> {
		std::mem::take(&mut self.calls)
	}

	fn fresh_id(&mut self) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;
		id
	}
}

impl OutputTree for RecordingTree {
	type Node = NodeId;

	fn create_node(&mut self, tag: &str) -> NodeId {
		let node = self.fresh_id();
		self.calls.push(Call::CreateNode {
			node,
			tag: tag.to_owned(),
		});
		node
	}

	fn create_text_node(&mut self) -> NodeId {
		let node = self.fresh_id();
		self.calls.push(Call::CreateTextNode { node });
		node
	}

	fn set_property(&mut self, node: &NodeId, name: &str, value: &Value) {
		self.calls.push(Call::SetProperty {
			node: *node,
			name: name.to_owned(),
			value: value.clone(),
		});
	}

	fn clear_property(&mut self, node: &NodeId, name: &str) {
		self.calls.push(Call::ClearProperty {
			node: *node,
			name: name.to_owned(),
		});
	}

	fn add_event_subscription(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
		self.calls.push(Call::AddEvent {
			node: *node,
			event: event.to_owned(),
			handler: handler.clone(),
		});
	}

	fn remove_event_subscription(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
		self.calls.push(Call::RemoveEvent {
			node: *node,
			event: event.to_owned(),
			handler: handler.clone(),
		});
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.calls.push(Call::AppendChild {
			parent: *parent,
			child: *child,
		});
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.calls.push(Call::RemoveChild {
			parent: *parent,
			child: *child,
		});
	}
}

/// A budget that never runs out: one `work_loop` call builds and commits the
/// whole pass.
pub struct Unlimited;
impl Deadline for Unlimited {
	fn time_remaining(&self) -> f64 {
		f64::INFINITY
	}
}

/// A budget that is always spent: every `work_loop` call performs exactly one
/// unit of work and yields.
pub struct Exhausted;
impl Deadline for Exhausted {
	fn time_remaining(&self) -> f64 {
		0.0
	}
}

/// Runs the work loop to quiescence, the way a host idle loop eventually
/// would.
pub fn drive(reconciler: &mut Reconciler<RecordingTree>, host: &mut RecordingTree) {
	while reconciler.has_pending_work() {
		reconciler.work_loop(host, &Unlimited);
	}
}
