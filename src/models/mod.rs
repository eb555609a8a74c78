//! Domain models for the backlog hierarchy.
//!
//! # Core Concepts
//!
//! - [`Node`]: one backlog item (epic, feature, task or bug). Nodes form a forest
//!   through `parent_id`; the root group is every node without a parent.
//! - [`NodeType`]: the closed set of item kinds. Which kinds may contain which is
//!   decided by [`crate::hierarchy::containment`].
//! - [`NodeTreeNode`]: a node with its nested, ordered children, as produced by
//!   [`crate::hierarchy::build_forest`].
//! - [`OrderUpdate`] / [`OrderSwap`]: order writes planned by the reorder engine.

mod node;
mod ordering;

pub use node::*;
pub use ordering::*;
