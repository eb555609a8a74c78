use backlog::db::Database;
use backlog::error::HierarchyError;
use backlog::hierarchy::NodeStore;
use backlog::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn new_node(title: &str, node_type: NodeType, parent_id: Option<Uuid>, order: i64) -> NewNode {
    let mut input = CreateNodeInput::new(title, node_type);
    input.parent_id = parent_id;
    NewNode::from_input(input, order)
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "create_node" {
        it "creates a root node with defaults" {
            let node = db.create_node(new_node("Checkout", NodeType::Epic, None, 0))
                .expect("Failed to create node");

            assert_eq!(node.title, "Checkout");
            assert_eq!(node.node_type, NodeType::Epic);
            assert_eq!(node.status, NodeStatus::Backlog);
            assert_eq!(node.priority, NodePriority::Medium);
            assert!(node.parent_id.is_none());
        }

        it "round-trips every field through storage" {
            let due = chrono::Utc::now();
            let org = Uuid::new_v4();
            let mut input = CreateNodeInput::new("Cart", NodeType::Feature);
            input.description = Some("Persistent cart".to_string());
            input.status = Some(NodeStatus::InProgress);
            input.priority = Some(NodePriority::Critical);
            input.organization_id = Some(org);
            input.due_date = Some(due);
            input.started_at = Some(due);
            input.completed_at = Some(due);
            input.estimated_points = Some(5);
            input.estimated_hours = Some(12.5);

            let created = db.create_node(NewNode::from_input(input, 3)).expect("Failed to create");
            let found = db.get_node(created.id).expect("Query failed").expect("Node missing");

            assert_eq!(found, created);
            assert_eq!(found.order, 3);
            assert_eq!(found.organization_id, Some(org));
            assert_eq!(found.estimated_hours, Some(12.5));
            assert_eq!(found.completed_at, Some(due));
        }
    }

    describe "get_node" {
        it "returns None for non-existent node" {
            let result = db.get_node(Uuid::new_v4()).expect("Query failed");
            assert!(result.is_none());
        }
    }

    describe "get_children" {
        it "returns the root group for None" {
            let root = db.create_node(new_node("Root", NodeType::Epic, None, 0)).unwrap();
            db.create_node(new_node("Child", NodeType::Feature, Some(root.id), 0)).unwrap();

            let roots = db.get_children(None).expect("Query failed");
            assert_eq!(roots.len(), 1);
            assert_eq!(roots[0].id, root.id);
        }

        it "returns direct children ordered by sort order" {
            let root = db.create_node(new_node("Root", NodeType::Epic, None, 0)).unwrap();
            db.create_node(new_node("Second", NodeType::Feature, Some(root.id), 1)).unwrap();
            let first = db.create_node(new_node("First", NodeType::Feature, Some(root.id), 0)).unwrap();
            db.create_node(new_node("Grandchild", NodeType::Task, Some(first.id), 0)).unwrap();

            let children = db.get_children(Some(root.id)).expect("Query failed");
            let titles: Vec<_> = children.iter().map(|n| n.title.as_str()).collect();
            assert_eq!(titles, vec!["First", "Second"]);
        }
    }

    describe "update_node" {
        it "returns None for non-existent node" {
            let result = db.update_node(Uuid::new_v4(), UpdateNodeInput::order(1)).expect("Query failed");
            assert!(result.is_none());
        }

        it "leaves unspecified fields unchanged" {
            let node = db.create_node(new_node("Original", NodeType::Task, None, 4)).unwrap();

            let updated = db.update_node(node.id, UpdateNodeInput {
                status: Some(NodeStatus::Done),
                ..Default::default()
            }).unwrap().unwrap();

            assert_eq!(updated.status, NodeStatus::Done);
            assert_eq!(updated.title, "Original");
            assert_eq!(updated.order, 4);
            assert_eq!(updated.created_at, node.created_at);
        }

        it "updates order and parent together" {
            let a = db.create_node(new_node("A", NodeType::Epic, None, 0)).unwrap();
            let b = db.create_node(new_node("B", NodeType::Feature, None, 1)).unwrap();

            let updated = db.update_node(b.id, UpdateNodeInput {
                parent_id: Some(Some(a.id)),
                order: Some(9),
                ..Default::default()
            }).unwrap().unwrap();

            assert_eq!(updated.parent_id, Some(a.id));
            assert_eq!(updated.order, 9);
        }

        it "clears the parent on an explicit null" {
            let a = db.create_node(new_node("A", NodeType::Epic, None, 0)).unwrap();
            let b = db.create_node(new_node("B", NodeType::Feature, Some(a.id), 0)).unwrap();

            db.update_node(b.id, UpdateNodeInput::parent(None)).unwrap();

            let found = db.get_node(b.id).unwrap().unwrap();
            assert!(found.parent_id.is_none());
        }

        it "clears every nullable field on an explicit null" {
            let now = chrono::Utc::now();
            let mut input = CreateNodeInput::new("Cart", NodeType::Feature);
            input.description = Some("old".to_string());
            input.organization_id = Some(Uuid::new_v4());
            input.due_date = Some(now);
            input.started_at = Some(now);
            input.completed_at = Some(now);
            input.estimated_points = Some(8);
            input.estimated_hours = Some(1.5);
            let node = db.create_node(NewNode::from_input(input, 0)).unwrap();

            db.update_node(node.id, UpdateNodeInput {
                description: Some(None),
                organization_id: Some(None),
                due_date: Some(None),
                started_at: Some(None),
                completed_at: Some(None),
                estimated_points: Some(None),
                estimated_hours: Some(None),
                ..Default::default()
            }).unwrap();

            let found = db.get_node(node.id).unwrap().unwrap();
            assert!(found.description.is_none());
            assert!(found.organization_id.is_none());
            assert!(found.due_date.is_none());
            assert!(found.started_at.is_none());
            assert!(found.completed_at.is_none());
            assert!(found.estimated_points.is_none());
            assert!(found.estimated_hours.is_none());
            assert_eq!(found.title, "Cart");
        }
    }

    describe "update_node_checked" {
        it "hands the current nodes to the check and writes its update" {
            let a = db.create_node(new_node("A", NodeType::Epic, None, 0)).unwrap();
            let b = db.create_node(new_node("B", NodeType::Feature, None, 1)).unwrap();

            let updated = db.update_node_checked(b.id, |nodes| {
                assert_eq!(nodes.len(), 2);
                Ok(UpdateNodeInput::parent(Some(a.id)))
            }).unwrap().unwrap();

            assert_eq!(updated.parent_id, Some(a.id));
            assert_eq!(db.get_node(b.id).unwrap().unwrap().parent_id, Some(a.id));
        }

        it "writes nothing when the check rejects" {
            let a = db.create_node(new_node("A", NodeType::Epic, None, 0)).unwrap();

            let err = db.update_node_checked(a.id, |_| {
                Err(HierarchyError::Cycle { node: a.id, parent: a.id })
            }).unwrap_err();

            assert!(matches!(err, HierarchyError::Cycle { .. }));
            assert!(db.get_node(a.id).unwrap().unwrap().parent_id.is_none());
        }

        it "returns None for a node that does not exist" {
            let result = db.update_node_checked(Uuid::new_v4(), |_| Ok(UpdateNodeInput::order(1)))
                .unwrap();
            assert!(result.is_none());
        }
    }

    describe "delete_node" {
        it "returns false for non-existent node" {
            assert!(!db.delete_node(Uuid::new_v4()).expect("Query failed"));
        }

        it "cascades to all descendants" {
            let epic = db.create_node(new_node("Epic", NodeType::Epic, None, 0)).unwrap();
            let feature = db.create_node(new_node("Feature", NodeType::Feature, Some(epic.id), 0)).unwrap();
            let task = db.create_node(new_node("Task", NodeType::Task, Some(feature.id), 0)).unwrap();
            let bug = db.create_node(new_node("Bug", NodeType::Bug, Some(task.id), 0)).unwrap();
            let other = db.create_node(new_node("Other", NodeType::Epic, None, 1)).unwrap();

            assert!(db.delete_node(epic.id).unwrap());

            for id in [epic.id, feature.id, task.id, bug.id] {
                assert!(db.get_node(id).unwrap().is_none());
            }
            assert!(db.get_node(other.id).unwrap().is_some());
        }
    }

    describe "swap_node_orders" {
        it "exchanges both orders" {
            let a = db.create_node(new_node("A", NodeType::Bug, None, 0)).unwrap();
            let b = db.create_node(new_node("B", NodeType::Bug, None, 1)).unwrap();

            let swapped = db.swap_node_orders(
                OrderUpdate { id: a.id, order: 1 },
                OrderUpdate { id: b.id, order: 0 },
            ).unwrap();

            assert!(swapped);
            assert_eq!(db.get_node(a.id).unwrap().unwrap().order, 1);
            assert_eq!(db.get_node(b.id).unwrap().unwrap().order, 0);
        }

        it "writes nothing when one side is missing" {
            let a = db.create_node(new_node("A", NodeType::Bug, None, 0)).unwrap();

            let swapped = db.swap_node_orders(
                OrderUpdate { id: a.id, order: 7 },
                OrderUpdate { id: Uuid::new_v4(), order: 0 },
            ).unwrap();

            assert!(!swapped);
            assert_eq!(db.get_node(a.id).unwrap().unwrap().order, 0);
        }
    }

    describe "node_store" {
        it "lists every node through the store interface" {
            let root = db.create(new_node("Root", NodeType::Epic, None, 0)).unwrap();
            db.create(new_node("Child", NodeType::Bug, Some(root.id), 0)).unwrap();

            assert_eq!(db.list_all().unwrap().len(), 2);
            assert_eq!(db.list_children(Some(root.id)).unwrap().len(), 1);
            assert!(db.delete_cascade(root.id).unwrap());
            assert!(db.list_all().unwrap().is_empty());
        }
    }
}

#[test]
fn on_disk_database_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("backlog.db");

    let id = {
        let db = Database::open(path.clone()).expect("Failed to open");
        db.migrate().expect("Failed to migrate");
        db.create_node(new_node("Persisted", NodeType::Epic, None, 0))
            .expect("Failed to create")
            .id
    };

    let db = Database::open(path).expect("Failed to reopen");
    db.migrate().expect("Migrations should be idempotent");
    let node = db.get_node(id).expect("Query failed").expect("Node missing");
    assert_eq!(node.title, "Persisted");
}
