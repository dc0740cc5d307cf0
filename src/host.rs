//! The two interfaces the reconciler requires of its host.
//!
//! Neither is implemented in this crate outside of tests: the output tree is
//! whatever persistent structure the embedder maintains (a DOM, a widget
//! tree, a scene graph), and the deadline comes from whatever cooperative
//! scheduling primitive the embedder has (an idle callback, a frame budget).

use crate::element::{EventHandler, Value};

/// The mutation interface to the persistent output tree.
///
/// All operations are local, synchronous and trusted: the reconciler performs
/// no retries and treats them as infallible at this abstraction layer. A
/// misbehaving implementation (say, removing a node that isn't present) is
/// free to panic; the reconciler will not catch it.
pub trait OutputTree {
	/// A cheaply cloneable handle to one output node. Handles are shared
	/// between the committed tree and the work-in-progress tree when a node
	/// is reused across renders; they are never duplicated into two nodes.
	type Node: Clone;

	fn create_node(&mut self, tag: &str) -> Self::Node;
	fn create_text_node(&mut self) -> Self::Node;

	fn set_property(&mut self, node: &Self::Node, name: &str, value: &Value);
	/// Resets a property to its empty/default value.
	fn clear_property(&mut self, node: &Self::Node, name: &str);

	/// Subscribes `handler` to `event` (already host-normalized, e.g.
	/// `click`) on `node`.
	fn add_event_subscription(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);
	fn remove_event_subscription(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
}

/// A shrinking time budget handed to [`Reconciler::work_loop`] by the host's
/// idle-scheduling primitive.
///
/// The host must keep re-invoking the work loop indefinitely after it
/// returns; there is no completion signal and no teardown, by design of this
/// minimal engine.
///
/// [`Reconciler::work_loop`]: crate::Reconciler::work_loop
pub trait Deadline {
	/// Milliseconds of budget left in this invocation. Monotonically
	/// non-increasing within one invocation of the work loop.
	fn time_remaining(&self) -> f64;
}
