//! Sibling ordering: one-step moves, renumbering and append position.
//!
//! All functions plan writes against a snapshot; persisting them is the
//! caller's job (see [`crate::hierarchy::Hierarchy`]).

use std::collections::BTreeMap;

use uuid::Uuid;

use super::sibling_cmp;
use crate::error::{HierarchyError, Result};
use crate::models::{Direction, Node, OrderSwap, OrderUpdate};

/// All nodes sharing `parent_id` (the root group for `None`), in display order.
pub fn siblings_of(nodes: &[Node], parent_id: Option<Uuid>) -> Vec<&Node> {
    let mut siblings: Vec<&Node> = nodes.iter().filter(|n| n.parent_id == parent_id).collect();
    siblings.sort_by(|a, b| sibling_cmp(a, b));
    siblings
}

/// Plan swapping `node_id` with its neighbor in `direction`.
///
/// Returns `Ok(None)` when the node is already first (moving earlier) or last
/// (moving later), and when the neighbor holds the same order value: swapping
/// equal values would change nothing. The returned swap exchanges the two
/// order values exactly; no other sibling is touched.
pub fn plan_move_one_step(
    nodes: &[Node],
    node_id: Uuid,
    direction: Direction,
) -> Result<Option<OrderSwap>> {
    let subject = nodes
        .iter()
        .find(|n| n.id == node_id)
        .ok_or(HierarchyError::NotFound { id: node_id })?;

    let siblings = siblings_of(nodes, subject.parent_id);
    let index = siblings
        .iter()
        .position(|n| n.id == node_id)
        .ok_or(HierarchyError::NotFound { id: node_id })?;

    let target_index = match direction {
        Direction::Earlier => index.checked_sub(1),
        Direction::Later => Some(index + 1).filter(|&i| i < siblings.len()),
    };
    let Some(target) = target_index.map(|i| siblings[i]) else {
        tracing::debug!(node = %node_id, ?direction, "node already at boundary; nothing to reorder");
        return Ok(None);
    };

    if target.order == subject.order {
        tracing::warn!(
            node = %node_id,
            sibling = %target.id,
            order = subject.order,
            "siblings share an order value; normalize before reordering"
        );
        return Ok(None);
    }

    Ok(Some(OrderSwap {
        node: OrderUpdate {
            id: subject.id,
            order: target.order,
        },
        sibling: OrderUpdate {
            id: target.id,
            order: subject.order,
        },
    }))
}

/// Renumber every sibling group to `0..n` in current display order.
///
/// Only nodes whose order actually changes are returned, so a second run over
/// the repaired snapshot yields nothing. Groups are emitted in a fixed key order.
pub fn normalize_sibling_orders(nodes: &[Node]) -> Vec<OrderUpdate> {
    let mut groups: BTreeMap<Option<Uuid>, Vec<&Node>> = BTreeMap::new();
    for node in nodes {
        groups.entry(node.parent_id).or_default().push(node);
    }

    let mut updates = Vec::new();
    for group in groups.values_mut() {
        group.sort_by(|a, b| sibling_cmp(a, b));
        for (position, node) in group.iter().enumerate() {
            let order = position as i64;
            if node.order != order {
                updates.push(OrderUpdate { id: node.id, order });
            }
        }
    }
    updates
}

/// Order for a node appended after `siblings`: one past the current maximum,
/// or 0 for an empty group.
///
/// Fails with [`HierarchyError::OrderExhausted`] when the maximum is already
/// `i64::MAX`; renumbering the group frees the range again.
pub fn next_child_order<'a>(siblings: impl IntoIterator<Item = &'a Node>) -> Result<i64> {
    match siblings.into_iter().map(|n| n.order).max() {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .ok_or(HierarchyError::OrderExhausted { max }),
    }
}
