//! Runs the hierarchy rules against a [`NodeStore`].
//!
//! Every mutation validates first and writes second: a rejected operation
//! leaves the store untouched. No snapshot is kept between calls; each
//! operation reads what it needs from the store.

use uuid::Uuid;

use super::containment::{allowed_child_types, can_contain, check_containment};
use super::cycle::check_reparent;
use super::reorder::{next_child_order, normalize_sibling_orders, plan_move_one_step, siblings_of};
use super::store::NodeStore;
use super::tree::build_forest;
use super::sibling_cmp;
use crate::error::{HierarchyError, Result};
use crate::models::*;

/// Knobs for behavior the rule table leaves open.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyPolicy {
    /// Also apply the containment rules when reparenting an existing node.
    /// Off by default: only creation is checked.
    pub validate_containment_on_move: bool,
}

#[derive(Debug, Clone)]
pub struct Hierarchy<S> {
    store: S,
    policy: HierarchyPolicy,
}

impl<S: NodeStore> Hierarchy<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, HierarchyPolicy::default())
    }

    pub fn with_policy(store: S, policy: HierarchyPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> HierarchyPolicy {
        self.policy
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.store.list_all()?)
    }

    pub fn get_node(&self, id: Uuid) -> Result<Node> {
        self.store
            .get_by_id(id)?
            .ok_or(HierarchyError::NotFound { id })
    }

    /// Direct children of a node (or the root group for `None`) in display order.
    pub fn children(&self, parent_id: Option<Uuid>) -> Result<Vec<Node>> {
        if let Some(id) = parent_id {
            self.get_node(id)?;
        }
        let mut children = self.store.list_children(parent_id)?;
        children.sort_by(sibling_cmp);
        Ok(children)
    }

    pub fn forest(&self) -> Result<Vec<NodeTreeNode>> {
        Ok(build_forest(self.store.list_all()?))
    }

    /// Types that may be created directly under the given node.
    pub fn allowed_children(&self, id: Uuid) -> Result<&'static [NodeType]> {
        let node = self.get_node(id)?;
        Ok(allowed_child_types(node.node_type))
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Create a node, appended after its existing siblings.
    pub fn create_node(&self, mut input: CreateNodeInput) -> Result<Node> {
        if input.title.trim().is_empty() {
            return Err(HierarchyError::BlankTitle);
        }
        input.description = input.description.filter(|d| !d.trim().is_empty());

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .store
                .get_by_id(parent_id)?
                .ok_or(HierarchyError::ParentNotFound { id: parent_id })?;
            check_containment(parent.node_type, input.node_type).inspect_err(|e| {
                tracing::warn!(parent = %parent_id, "rejected create: {}", e);
            })?;
        }

        let siblings = self.store.list_children(input.parent_id)?;
        let order = next_child_order(&siblings).inspect_err(|e| {
            tracing::warn!(parent = ?input.parent_id, "rejected create: {}", e);
        })?;
        let node = self.store.create(NewNode::from_input(input, order))?;

        tracing::info!(
            node = %node.id,
            node_type = node.node_type.as_str(),
            order = node.order,
            "created node"
        );
        Ok(node)
    }

    /// Partially update a node.
    ///
    /// A parent change is checked by the cycle guard (and by the containment
    /// rules when the policy asks for it). Without an explicit `order`, a moved
    /// node goes to the end of its new sibling group. A type change must stay
    /// compatible with both the node's parent and its direct children. These
    /// checks run inside [`NodeStore::update_checked`], against the nodes as
    /// they are when the write happens.
    pub fn update_node(&self, id: Uuid, mut input: UpdateNodeInput) -> Result<Node> {
        let existing = self.get_node(id)?;

        if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(HierarchyError::BlankTitle);
        }
        if matches!(&input.description, Some(Some(d)) if d.trim().is_empty()) {
            input.description = Some(None);
        }

        let reparenting = input.parent_id.is_some_and(|p| p != existing.parent_id);
        let retyping = input.node_type.is_some_and(|t| t != existing.node_type);

        let updated = if reparenting || retyping {
            let policy = self.policy;
            self.store
                .update_checked(id, |nodes| prepare_structural_update(id, input, nodes, policy))?
        } else {
            self.store.update_fields(id, input)?
        };
        let node = updated.ok_or(HierarchyError::NotFound { id })?;

        if node.parent_id != existing.parent_id {
            tracing::info!(node = %id, parent = ?node.parent_id, order = node.order, "moved node");
        } else {
            tracing::debug!(node = %id, "updated node");
        }
        Ok(node)
    }

    /// Reparent a node; `None` moves it to the root group.
    pub fn move_node(&self, id: Uuid, new_parent_id: Option<Uuid>) -> Result<Node> {
        self.update_node(id, UpdateNodeInput::parent(new_parent_id))
    }

    /// Swap a node with its neighbor in `direction`.
    ///
    /// Returns `Ok(None)` if the node is already at that end of its sibling
    /// group. On any failure the caller should re-read the tree rather than
    /// trust a locally swapped copy.
    pub fn move_one_step(&self, id: Uuid, direction: Direction) -> Result<Option<OrderSwap>> {
        let nodes = self.store.list_all()?;
        let Some(swap) = plan_move_one_step(&nodes, id, direction)? else {
            return Ok(None);
        };

        match self.store.swap_orders(swap.node, swap.sibling) {
            Ok(true) => {
                tracing::info!(
                    node = %swap.node.id,
                    sibling = %swap.sibling.id,
                    ?direction,
                    "swapped sibling order"
                );
                Ok(Some(swap))
            }
            Ok(false) => {
                tracing::warn!(node = %id, "reorder target disappeared; re-fetch before retrying");
                let missing = if self.store.get_by_id(id)?.is_none() {
                    id
                } else {
                    swap.sibling.id
                };
                Err(HierarchyError::NotFound { id: missing })
            }
            Err(e) => {
                tracing::warn!(
                    node = %id,
                    error = %e,
                    "reorder failed; sibling orders may need normalizing"
                );
                Err(e.into())
            }
        }
    }

    /// Renumber every sibling group to `0..n`, writing only changed orders.
    pub fn normalize(&self) -> Result<Vec<OrderUpdate>> {
        let nodes = self.store.list_all()?;
        let planned = normalize_sibling_orders(&nodes);

        let mut applied = Vec::with_capacity(planned.len());
        for update in planned {
            if self
                .store
                .update_fields(update.id, UpdateNodeInput::order(update.order))?
                .is_some()
            {
                applied.push(update);
            }
        }

        if applied.is_empty() {
            tracing::debug!("sibling orders already normalized");
        } else {
            tracing::info!(count = applied.len(), "normalized sibling orders");
        }
        Ok(applied)
    }

    /// Delete a node and its whole subtree.
    pub fn delete_node(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_cascade(id)? {
            return Err(HierarchyError::NotFound { id });
        }
        tracing::info!(node = %id, "deleted node and descendants");
        Ok(())
    }
}

/// Validate a parent or type change against `nodes` and fill in the append
/// order for a move that did not name one.
fn prepare_structural_update(
    id: Uuid,
    mut input: UpdateNodeInput,
    nodes: &[Node],
    policy: HierarchyPolicy,
) -> Result<UpdateNodeInput> {
    let existing = nodes
        .iter()
        .find(|n| n.id == id)
        .ok_or(HierarchyError::NotFound { id })?;

    let new_parent = input.parent_id.filter(|p| *p != existing.parent_id);
    let new_type = input.node_type.filter(|t| *t != existing.node_type);
    let final_type = new_type.unwrap_or(existing.node_type);
    let final_parent = new_parent.unwrap_or(existing.parent_id);

    if let Some(parent_id) = new_parent {
        check_reparent(id, parent_id, nodes)?;
        if let Some(pid) = parent_id {
            let parent = nodes
                .iter()
                .find(|n| n.id == pid)
                .ok_or(HierarchyError::ParentNotFound { id: pid })?;
            if policy.validate_containment_on_move {
                check_containment(parent.node_type, final_type)?;
            }
        }
        if input.order.is_none() {
            input.order = Some(next_child_order(siblings_of(nodes, parent_id))?);
        }
    }

    if let Some(to) = new_type {
        check_type_change(existing, to, final_parent, nodes)?;
    }

    Ok(input)
}

fn check_type_change(
    node: &Node,
    to: NodeType,
    parent_id: Option<Uuid>,
    nodes: &[Node],
) -> Result<()> {
    let reject = |reason: String| HierarchyError::TypeChange {
        node: node.id,
        to,
        reason,
    };

    if let Some(parent) = parent_id.and_then(|pid| nodes.iter().find(|n| n.id == pid)) {
        if !can_contain(parent.node_type, to) {
            return Err(reject(format!(
                "its parent is a {}",
                parent.node_type.as_str()
            )));
        }
    }

    if let Some(child) = nodes
        .iter()
        .find(|n| n.parent_id == Some(node.id) && !can_contain(to, n.node_type))
    {
        return Err(reject(format!(
            "it has a {} child",
            child.node_type.as_str()
        )));
    }

    Ok(())
}
