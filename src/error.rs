//! Error taxonomy for hierarchy operations.

use thiserror::Error;
use uuid::Uuid;

use crate::models::NodeType;

pub type Result<T> = std::result::Result<T, HierarchyError>;

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("node {id} not found")]
    NotFound { id: Uuid },

    #[error("parent node {id} not found")]
    ParentNotFound { id: Uuid },

    #[error("title must not be blank")]
    BlankTitle,

    #[error("cannot move node {node} under {parent}: it would create a cycle in the hierarchy")]
    Cycle { node: Uuid, parent: Uuid },

    #[error("a {} cannot contain a {}", .parent.as_str(), .child.as_str())]
    Containment { parent: NodeType, child: NodeType },

    #[error("cannot change node {node} to {}: {reason}", .to.as_str())]
    TypeChange {
        node: Uuid,
        to: NodeType,
        reason: String,
    },

    #[error("no order is left after {max} in this sibling group; normalize sibling orders first")]
    OrderExhausted { max: i64 },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl HierarchyError {
    /// Rejections raised before any write; the caller's input was at fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ParentNotFound { .. }
                | Self::BlankTitle
                | Self::Cycle { .. }
                | Self::Containment { .. }
                | Self::TypeChange { .. }
                | Self::OrderExhausted { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
