//! Cycle guard for reparenting.
//!
//! Storage does not enforce acyclicity of `parent_id`, so every reparent is
//! checked against a flat snapshot before it is written.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::error::{HierarchyError, Result};
use crate::models::Node;

/// Returns true if `candidate_id` is `subject_id` itself or any descendant of
/// it in `nodes`.
///
/// Breadth-first over child edges with a visited set, so it terminates on
/// snapshots that already contain a cycle and does not recurse.
pub fn is_descendant(candidate_id: Uuid, subject_id: Uuid, nodes: &[Node]) -> bool {
    if candidate_id == subject_id {
        return true;
    }

    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            children.entry(parent_id).or_default().push(node.id);
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([subject_id]);
    visited.insert(subject_id);

    while let Some(current) = queue.pop_front() {
        let Some(kids) = children.get(&current) else {
            continue;
        };
        for &kid in kids {
            if kid == candidate_id {
                return true;
            }
            if visited.insert(kid) {
                queue.push_back(kid);
            }
        }
    }

    false
}

/// Reject moving `node_id` under `new_parent_id` if that would close a cycle.
/// Moving to the root group (`None`) is always acyclic.
pub fn check_reparent(node_id: Uuid, new_parent_id: Option<Uuid>, nodes: &[Node]) -> Result<()> {
    match new_parent_id {
        Some(parent) if is_descendant(parent, node_id, nodes) => {
            tracing::warn!(node = %node_id, parent = %parent, "rejected reparent: cycle");
            Err(HierarchyError::Cycle {
                node: node_id,
                parent,
            })
        }
        _ => Ok(()),
    }
}
