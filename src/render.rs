//! ASCII tree rendering for backlog forests.

use crate::models::{NodeStatus, NodeTreeNode};

const BACKLOG: char = '◇';
const TODO: char = '○';
const IN_PROGRESS: char = '◐';
const DONE: char = '●';
const ARCHIVED: char = '✗';

fn status_symbol(status: NodeStatus) -> char {
    match status {
        NodeStatus::Backlog => BACKLOG,
        NodeStatus::Todo => TODO,
        NodeStatus::InProgress => IN_PROGRESS,
        NodeStatus::Done => DONE,
        NodeStatus::Archived => ARCHIVED,
    }
}

/// Render a forest as ASCII art, one line per node with its status and type.
///
/// Example output:
/// ```text
/// ◐ Checkout [EPIC]
/// ├── ● Cart [FEATURE]
/// │   └── ○ Persist cart [TASK]
/// └── ◇ Crash on empty cart [BUG]
/// ```
pub fn render_tree(nodes: &[NodeTreeNode]) -> String {
    let mut output = String::new();

    // (node, prefix, is_last); `is_last` is `None` for roots, which get no
    // branch characters. Children are pushed in reverse so they pop in order.
    let mut stack: Vec<(&NodeTreeNode, String, Option<bool>)> = nodes
        .iter()
        .rev()
        .map(|node| (node, String::new(), None))
        .collect();

    while let Some((node, prefix, is_last)) = stack.pop() {
        output.push_str(&prefix);
        if let Some(last) = is_last {
            output.push_str(if last { "└── " } else { "├── " });
        }
        output.push(status_symbol(node.node.status));
        output.push(' ');
        output.push_str(&node.node.title);
        output.push_str(" [");
        output.push_str(node.node.node_type.as_str());
        output.push_str("]\n");

        let child_prefix = match is_last {
            None => String::new(),
            Some(true) => format!("{}    ", prefix),
            Some(false) => format!("{}│   ", prefix),
        };

        let last_index = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate().rev() {
            stack.push((child, child_prefix.clone(), Some(i == last_index)));
        }
    }

    output
}
