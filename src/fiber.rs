//! Arena-backed storage for fiber records.
//!
//! Fibers form a first-child/next-sibling linked tree with parent and
//! alternate back-references — a shape that would be a lifetime headache with
//! owning pointers. Records therefore live in a generational arena and link
//! to each other by key: `child` and `sibling` are the owning direction,
//! `parent` and `alternate` are non-owning lookups. Stale keys (into an
//! already-released tree) simply resolve to nothing.

use crate::element::{Element, Props, Tag};
use slotmap::SlotMap;

slotmap::new_key_type! {
	/// Generational handle to one fiber record.
	pub(crate) struct FiberKey;
}

/// What commit should do with a fiber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
	/// Nothing; only container roots stay untagged.
	None,
	/// Fresh node, to be inserted under the nearest materialized ancestor.
	Placement,
	/// Reused node, to receive the property delta against its alternate.
	Update,
	/// Old node with no counterpart in the new tree, to be removed.
	Deletion,
}

/// One mutable unit of work, mirroring one element position per render pass.
pub(crate) struct Fiber<N> {
	/// `None` only for the synthetic container root seeded by `render`.
	pub tag: Option<Tag>,
	pub props: Props,
	/// Pending child elements, drained when this fiber is expanded.
	pub children: Vec<Element>,
	/// The output node owned by this fiber. Populated on first expansion, or
	/// carried over from the alternate when the fiber is an update.
	pub output: Option<N>,
	pub parent: Option<FiberKey>,
	pub child: Option<FiberKey>,
	pub sibling: Option<FiberKey>,
	/// The corresponding fiber in the previously committed tree, if any.
	pub alternate: Option<FiberKey>,
	pub effect: Effect,
}

pub(crate) struct FiberArena<N> {
	fibers: SlotMap<FiberKey, Fiber<N>>,
}

impl<N> FiberArena<N> {
	pub fn new() -> Self {
		Self {
			fibers: SlotMap::with_key(),
		}
	}

	pub fn insert(&mut self, fiber: Fiber<N>) -> FiberKey {
		self.fibers.insert(fiber)
	}

	pub fn len(&self) -> usize {
		self.fibers.len()
	}

	/// Releases a whole subtree, following the owning `child`/`sibling`
	/// links only. Iterative: tree depth must not bound the call stack.
	pub fn free_subtree(&mut self, root: FiberKey) {
		let mut pending = vec![root];
		while let Some(key) = pending.pop() {
			if let Some(fiber) = self.fibers.remove(key) {
				if let Some(child) = fiber.child {
					pending.push(child);
				}
				if let Some(sibling) = fiber.sibling {
					pending.push(sibling);
				}
			}
		}
	}
}

impl<N> core::ops::Index<FiberKey> for FiberArena<N> {
	type Output = Fiber<N>;

	fn index(&self, key: FiberKey) -> &Fiber<N> {
		&self.fibers[key]
	}
}

impl<N> core::ops::IndexMut<FiberKey> for FiberArena<N> {
	fn index_mut(&mut self, key: FiberKey) -> &mut Fiber<N> {
		&mut self.fibers[key]
	}
}
