//! The property/event delta between two prop bags of the same node.

use crate::element::{PropEntry, Props};
use crate::host::OutputTree;
use hashbrown::HashMap;
use tracing::trace;

/// Applies to `node` exactly the difference between `prev` and `next`.
///
/// Pass order is load-bearing: stale subscriptions must be gone before their
/// replacements are added, or a host could briefly hold two live handlers
/// (or re-add one it was about to drop).
///
/// 1. Remove event subscriptions that are gone or whose handler changed.
/// 2. Clear plain properties that are gone.
/// 3. Set plain properties that are new or changed.
/// 4. Add event subscriptions that are new or whose handler changed.
///
/// Handler equality is reference identity; value equality is plain value
/// comparison. An unchanged entry produces no host call at all.
pub(crate) fn apply_property_delta<H: OutputTree>(host: &mut H, node: &H::Node, prev: &Props, next: &Props) {
	let prev_index: HashMap<&str, &PropEntry> = prev.entries().collect();
	let next_index: HashMap<&str, &PropEntry> = next.entries().collect();

	for (name, entry) in prev.entries() {
		if let PropEntry::Handler { event, handler } = entry {
			let survives = match next_index.get(name) {
				Some(PropEntry::Handler { handler: next_handler, .. }) => next_handler == handler,
				_ => false,
			};
			if !survives {
				trace_prop("removing event subscription", name);
				host.remove_event_subscription(node, event, handler);
			}
		}
	}

	for (name, entry) in prev.entries() {
		if let PropEntry::Value(_) = entry {
			if !matches!(next_index.get(name), Some(PropEntry::Value(_))) {
				trace_prop("clearing property", name);
				host.clear_property(node, name);
			}
		}
	}

	for (name, entry) in next.entries() {
		if let PropEntry::Value(value) = entry {
			let unchanged = match prev_index.get(name) {
				Some(PropEntry::Value(prev_value)) => prev_value == value,
				_ => false,
			};
			if !unchanged {
				trace_prop("setting property", name);
				host.set_property(node, name, value);
			}
		}
	}

	for (name, entry) in next.entries() {
		if let PropEntry::Handler { event, handler } = entry {
			let unchanged = match prev_index.get(name) {
				Some(PropEntry::Handler { handler: prev_handler, .. }) => prev_handler == handler,
				_ => false,
			};
			if !unchanged {
				trace_prop("adding event subscription", name);
				host.add_event_subscription(node, event, handler);
			}
		}
	}
}

/// Prop names come from page content, so they only reach the log output with
/// the `content-logging` feature.
fn trace_prop(message: &str, name: &str) {
	if cfg!(feature = "content-logging") {
		trace!("{}: {:?}", message, name);
	} else {
		trace!("{}", message);
	}
}
