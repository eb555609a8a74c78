//! Which node types may directly contain which.
//!
//! ```text
//! EPIC    -> FEATURE, BUG
//! FEATURE -> TASK, BUG
//! TASK    -> BUG
//! BUG     -> (leaf)
//! ```

use crate::error::{HierarchyError, Result};
use crate::models::NodeType;

pub fn allowed_child_types(parent: NodeType) -> &'static [NodeType] {
    match parent {
        NodeType::Epic => &[NodeType::Feature, NodeType::Bug],
        NodeType::Feature => &[NodeType::Task, NodeType::Bug],
        NodeType::Task => &[NodeType::Bug],
        NodeType::Bug => &[],
    }
}

pub fn can_contain(parent: NodeType, child: NodeType) -> bool {
    allowed_child_types(parent).contains(&child)
}

/// Reject a parent/child type pairing the rule table does not allow.
pub fn check_containment(parent: NodeType, child: NodeType) -> Result<()> {
    if can_contain(parent, child) {
        Ok(())
    } else {
        Err(HierarchyError::Containment { parent, child })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epic_holds_features_and_bugs_only() {
        assert_eq!(
            allowed_child_types(NodeType::Epic),
            &[NodeType::Feature, NodeType::Bug]
        );
        assert!(check_containment(NodeType::Epic, NodeType::Task).is_err());
        assert!(check_containment(NodeType::Epic, NodeType::Epic).is_err());
    }

    #[test]
    fn feature_accepts_task() {
        assert!(check_containment(NodeType::Feature, NodeType::Task).is_ok());
        assert!(check_containment(NodeType::Feature, NodeType::Bug).is_ok());
        assert!(!can_contain(NodeType::Feature, NodeType::Feature));
    }

    #[test]
    fn bug_is_a_leaf() {
        assert!(allowed_child_types(NodeType::Bug).is_empty());
        for child in NodeType::ALL {
            let err = check_containment(NodeType::Bug, child).unwrap_err();
            assert!(matches!(
                err,
                HierarchyError::Containment {
                    parent: NodeType::Bug,
                    ..
                }
            ));
        }
    }

    #[test]
    fn nothing_contains_an_epic() {
        for parent in NodeType::ALL {
            assert!(!can_contain(parent, NodeType::Epic));
        }
    }

    #[test]
    fn task_holds_only_bugs() {
        assert_eq!(allowed_child_types(NodeType::Task), &[NodeType::Bug]);
    }
}
