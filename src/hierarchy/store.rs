//! Persistence interface consumed by the hierarchy service.

use anyhow::Result;
use uuid::Uuid;

use crate::error::Result as HierarchyResult;
use crate::models::{NewNode, Node, OrderUpdate, UpdateNodeInput};

/// A store of nodes.
///
/// Not-found is reported as `None` / `false`; any other failure is an error.
/// Each single-row write is assumed to be atomic.
pub trait NodeStore {
    fn list_all(&self) -> Result<Vec<Node>>;

    fn get_by_id(&self, id: Uuid) -> Result<Option<Node>>;

    /// Direct children of `parent_id`, or the root group for `None`.
    fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Node>>;

    /// Insert a node; the store assigns its id and timestamps.
    fn create(&self, node: NewNode) -> Result<Node>;

    /// Apply a partial update. Fields absent from `input` are left unchanged.
    fn update_fields(&self, id: Uuid, input: UpdateNodeInput) -> Result<Option<Node>>;

    /// Apply an update that is only valid against the current set of nodes.
    ///
    /// `prepare` sees a snapshot of every node and returns the update to
    /// write, or an error that aborts without writing. The default reads and
    /// writes in two steps, so a concurrent writer can land in between; stores
    /// with transactions should override this to take the snapshot and write
    /// under one transaction.
    fn update_checked<F>(&self, id: Uuid, prepare: F) -> HierarchyResult<Option<Node>>
    where
        F: FnOnce(&[Node]) -> HierarchyResult<UpdateNodeInput>,
    {
        let nodes = self.list_all()?;
        let input = prepare(&nodes)?;
        Ok(self.update_fields(id, input)?)
    }

    /// Remove a node and, transitively, all its descendants.
    fn delete_cascade(&self, id: Uuid) -> Result<bool>;

    /// Write both order values of a one-step reorder.
    ///
    /// The default performs two independent writes: if the second fails, the
    /// first has already landed and the sibling group may hold duplicate
    /// orders until it is normalized. Stores with multi-row transactions
    /// should override this. Returns `false` if either node no longer exists.
    fn swap_orders(&self, first: OrderUpdate, second: OrderUpdate) -> Result<bool> {
        if self
            .update_fields(first.id, UpdateNodeInput::order(first.order))?
            .is_none()
        {
            return Ok(false);
        }
        Ok(self
            .update_fields(second.id, UpdateNodeInput::order(second.order))?
            .is_some())
    }
}
