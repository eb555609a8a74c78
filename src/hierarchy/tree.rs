//! Builds the display forest from a flat node list.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::sibling_cmp;
use crate::models::{Node, NodeTreeNode};

type ChildrenMap = HashMap<Option<Uuid>, Vec<Node>>;

/// Convert a flat, unordered list into a forest sorted by sibling order at
/// every level.
///
/// A node whose parent is missing from `nodes` becomes a root rather than being
/// dropped. Nodes that cannot be reached from any root because their stored
/// parent chain loops are also surfaced as roots, so every input node appears
/// exactly once.
pub fn build_forest(nodes: Vec<Node>) -> Vec<NodeTreeNode> {
    let known: HashSet<Uuid> = nodes.iter().map(|n| n.id).collect();

    let mut children_map: ChildrenMap = HashMap::new();
    for node in nodes {
        let key = node.parent_id.filter(|p| known.contains(p));
        children_map.entry(key).or_default().push(node);
    }
    for group in children_map.values_mut() {
        group.sort_by(sibling_cmp);
    }

    let mut forest = build_level(None, &mut children_map);

    while let Some(node) = take_first_unplaced(&mut children_map) {
        tracing::warn!(node = %node.id, "node is part of a parent cycle; showing it as a root");
        let children = build_level(Some(node.id), &mut children_map);
        forest.push(NodeTreeNode { node, children });
    }

    forest
}

/// A sibling group being assembled: the nodes still to visit, the subtrees
/// finished so far, and the node they will hang under.
struct Frame {
    pending: std::vec::IntoIter<Node>,
    built: Vec<NodeTreeNode>,
    owner: Option<Node>,
}

/// Consumes the sibling group under `parent_id`, so no group is visited twice.
/// Walks depth-first with an explicit stack, so depth is bounded by memory
/// rather than by the call stack.
fn build_level(parent_id: Option<Uuid>, children_map: &mut ChildrenMap) -> Vec<NodeTreeNode> {
    let mut stack = vec![Frame {
        pending: children_map.remove(&parent_id).unwrap_or_default().into_iter(),
        built: Vec::new(),
        owner: None,
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(node) = frame.pending.next() {
            let group = children_map.remove(&Some(node.id)).unwrap_or_default();
            stack.push(Frame {
                pending: group.into_iter(),
                built: Vec::new(),
                owner: Some(node),
            });
            continue;
        }

        let Some(Frame { built, owner, .. }) = stack.pop() else {
            break;
        };
        match (owner, stack.last_mut()) {
            (Some(node), Some(parent)) => parent.built.push(NodeTreeNode {
                node,
                children: built,
            }),
            _ => return built,
        }
    }

    Vec::new()
}

fn take_first_unplaced(children_map: &mut ChildrenMap) -> Option<Node> {
    let key = children_map
        .iter()
        .filter_map(|(key, group)| group.first().map(|first| (*key, first)))
        .min_by(|(_, a), (_, b)| sibling_cmp(a, b))
        .map(|(key, _)| key)?;

    let group = children_map.get_mut(&key)?;
    let node = group.remove(0);
    if group.is_empty() {
        children_map.remove(&key);
    }
    Some(node)
}
