use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which neighbor a node swaps with when moved one step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards the start of the sibling list.
    #[serde(alias = "up")]
    Earlier,
    /// Towards the end of the sibling list.
    #[serde(alias = "down")]
    Later,
}

/// A single planned write of a node's sibling order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub order: i64,
}

/// The two writes produced by moving a node one step: the moved node takes its
/// neighbor's order and the neighbor takes the moved node's old order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderSwap {
    pub node: OrderUpdate,
    pub sibling: OrderUpdate,
}

/// Body of `POST /nodes/{id}/reorder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderInput {
    pub direction: Direction,
}

/// Result of a one-step reorder. `swap` is `None` when the node was already at
/// the boundary and nothing was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderResult {
    pub moved: bool,
    pub swap: Option<OrderSwap>,
}

/// Body of `POST /nodes/{id}/move`. A `null` parent moves the node to the root group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveInput {
    pub parent_id: Option<Uuid>,
}
