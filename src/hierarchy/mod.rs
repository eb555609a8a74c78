//! The hierarchy engine: containment rules, cycle guard, tree builder and
//! reorder engine, plus the [`Hierarchy`] service that runs them against a
//! [`NodeStore`].
//!
//! Everything except the service is pure and works over a flat snapshot of
//! nodes. The service never caches that snapshot across calls.

pub mod containment;
pub mod cycle;
pub mod reorder;
pub mod service;
pub mod store;
pub mod tree;

pub use containment::{allowed_child_types, can_contain, check_containment};
pub use cycle::{check_reparent, is_descendant};
pub use reorder::{next_child_order, normalize_sibling_orders, plan_move_one_step, siblings_of};
pub use service::{Hierarchy, HierarchyPolicy};
pub use store::NodeStore;
pub use tree::build_forest;

use std::cmp::Ordering;

use crate::models::Node;

/// Display order among siblings: by `order`, ties broken by creation time and
/// then id so rebuilds are reproducible whatever the input order.
pub(crate) fn sibling_cmp(a: &Node, b: &Node) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
