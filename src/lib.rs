#![doc(html_root_url = "https://docs.rs/weft/0.1.0")]
#![warn(clippy::pedantic)]

//! An incremental fiber-tree reconciler.
//!
//! Given a declarative [`Element`] tree and the previously committed render, a
//! [`Reconciler`] computes the minimal set of mutations needed to bring a
//! persistent output tree up to date and applies them through the abstract
//! [`OutputTree`] interface. Work happens cooperatively: the tree is expanded
//! one fiber at a time under a host-provided [`Deadline`] budget, and the
//! accumulated effects are applied in a single uninterruptible commit pass,
//! so the output tree is never observable in a half-updated state.
//!
//! # Known limitation
//!
//! Children are matched to their predecessors *positionally*, by type only —
//! there is no keyed reconciliation. Reordering a child list therefore
//! produces delete-and-recreate churn for every moved entry instead of a
//! move. This is intentional scope, not an oversight.

pub mod element;
pub mod host;
pub mod reconcile;

mod diff;
mod fiber;

pub use element::{Element, EventHandler, Props, Tag, Value};
pub use host::{Deadline, OutputTree};
pub use reconcile::Reconciler;
