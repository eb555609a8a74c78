use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A single backlog item.
///
/// Nodes form a forest through `parent_id`. The `order` field positions a node
/// among its siblings (nodes sharing the same `parent_id`); it is not unique at
/// the storage level and may become duplicated or gapped after interrupted
/// reorders, which [`crate::hierarchy::normalize_sibling_orders`] repairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub status: NodeStatus,
    pub priority: NodePriority,
    pub order: i64,
    pub organization_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_points: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The kind of a backlog item.
///
/// The hierarchy is Epic → Feature → Task, with bugs allowed under any of
/// them. See [`crate::hierarchy::allowed_child_types`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Epic,
    Feature,
    Task,
    Bug,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [Self::Epic, Self::Feature, Self::Task, Self::Bug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "EPIC",
            Self::Feature => "FEATURE",
            Self::Task => "TASK",
            Self::Bug => "BUG",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "EPIC" => Some(Self::Epic),
            "FEATURE" => Some(Self::Feature),
            "TASK" => Some(Self::Task),
            "BUG" => Some(Self::Bug),
            _ => None,
        }
    }
}

/// Workflow status of a backlog item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Done,
    Archived,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Archived => "ARCHIVED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BACKLOG" => Some(Self::Backlog),
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            "ARCHIVED" => Some(Self::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl NodePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Input for creating a new node. The sibling `order` is computed by the
/// hierarchy service, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNodeInput {
    /// Parent node ID. `None` creates a root node.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Defaults to `Backlog`.
    #[serde(default)]
    pub status: Option<NodeStatus>,
    /// Defaults to `Medium`.
    #[serde(default)]
    pub priority: Option<NodePriority>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_points: Option<i64>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

impl CreateNodeInput {
    /// Minimal input: a titled node of the given type, with no parent.
    pub fn new(title: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            parent_id: None,
            title: title.into(),
            description: None,
            node_type,
            status: None,
            priority: None,
            organization_id: None,
            assignee_id: None,
            due_date: None,
            started_at: None,
            completed_at: None,
            estimated_points: None,
            estimated_hours: None,
        }
    }

    pub fn under(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// A fully resolved node ready to be inserted by a store.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub node_type: NodeType,
    pub status: NodeStatus,
    pub priority: NodePriority,
    pub order: i64,
    pub organization_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_points: Option<i64>,
    pub estimated_hours: Option<f64>,
}

impl NewNode {
    pub fn from_input(input: CreateNodeInput, order: i64) -> Self {
        Self {
            parent_id: input.parent_id,
            title: input.title,
            description: input.description,
            node_type: input.node_type,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            order,
            organization_id: input.organization_id,
            assignee_id: input.assignee_id,
            due_date: input.due_date,
            started_at: input.started_at,
            completed_at: input.completed_at,
            estimated_points: input.estimated_points,
            estimated_hours: input.estimated_hours,
        }
    }
}

/// Input for a partial update. Absent fields are left unchanged.
///
/// Every nullable field is doubly optional: an absent key leaves the value
/// alone, an explicit `null` clears it. For `parent_id`, clearing moves the node
/// to the root group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNodeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<NodePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<Uuid>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_points: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_hours: Option<Option<f64>>,
}

impl UpdateNodeInput {
    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn parent(parent_id: Option<Uuid>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }
}

/// A present key always yields `Some`, so `null` becomes `Some(None)`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A node with its nested children, used for tree responses.
///
/// The `node` fields are flattened into the JSON response, with an additional
/// `children` array sorted by sibling order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTreeNode {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<NodeTreeNode>,
}
