mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::error::Result as HierarchyResult;
use crate::hierarchy::NodeStore;
use crate::models::*;

const NODE_COLUMNS: &str = "id, parent_id, title, description, node_type, status, priority, \
     sort_order, organization_id, assignee_id, due_date, started_at, completed_at, \
     estimated_points, estimated_hours, created_at, updated_at";

/// SQLite-backed node store.
///
/// Descendants are removed by the `ON DELETE CASCADE` foreign key on
/// `parent_id`, which requires `foreign_keys` to be enabled per connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open `path` if given, otherwise the platform default location.
    pub fn open_configured(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Self::open_default(),
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "backlog")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("backlog.db"))
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Node operations
    // ============================================================

    pub fn get_all_nodes(&self) -> Result<Vec<Node>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_all(&conn)
    }

    pub fn get_node(&self, id: Uuid) -> Result<Option<Node>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        query_node(&conn, id)
    }

    /// Direct children of `parent_id`; `None` selects the root group.
    pub fn get_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Node>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes WHERE parent_id IS ? \
             ORDER BY sort_order, created_at, id"
        ))?;

        let nodes = stmt
            .query_map([parent_id.map(|u| u.to_string())], node_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    pub fn create_node(&self, new: NewNode) -> Result<Node> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            &format!(
                "INSERT INTO nodes ({NODE_COLUMNS})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                id.to_string(),
                new.parent_id.map(|u| u.to_string()),
                &new.title,
                &new.description,
                new.node_type.as_str(),
                new.status.as_str(),
                new.priority.as_str(),
                new.order,
                new.organization_id.map(|u| u.to_string()),
                new.assignee_id.map(|u| u.to_string()),
                new.due_date.map(|d| d.to_rfc3339()),
                new.started_at.map(|d| d.to_rfc3339()),
                new.completed_at.map(|d| d.to_rfc3339()),
                new.estimated_points,
                new.estimated_hours,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Node {
            id,
            parent_id: new.parent_id,
            title: new.title,
            description: new.description,
            node_type: new.node_type,
            status: new.status,
            priority: new.priority,
            order: new.order,
            organization_id: new.organization_id,
            assignee_id: new.assignee_id,
            due_date: new.due_date,
            started_at: new.started_at,
            completed_at: new.completed_at,
            estimated_points: new.estimated_points,
            estimated_hours: new.estimated_hours,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_node(&self, id: Uuid, input: UpdateNodeInput) -> Result<Option<Node>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        apply_update(&conn, id, input)
    }

    /// Read every node, let `prepare` validate and build the update, then
    /// write it, all inside one immediate transaction. A rejection from
    /// `prepare` rolls back without writing.
    pub fn update_node_checked<F>(&self, id: Uuid, prepare: F) -> HierarchyResult<Option<Node>>
    where
        F: FnOnce(&[Node]) -> HierarchyResult<UpdateNodeInput>,
    {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin update transaction")?;

        let nodes = query_all(&tx)?;
        let input = prepare(&nodes)?;
        let node = apply_update(&tx, id, input)?;

        tx.commit().context("Failed to commit update")?;
        Ok(node)
    }

    pub fn delete_node(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM nodes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Write both orders of a reorder in one transaction. Nothing is written
    /// unless both nodes exist.
    pub fn swap_node_orders(&self, first: OrderUpdate, second: OrderUpdate) -> Result<bool> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let mut updated = 0;
        for update in [first, second] {
            updated += tx.execute(
                "UPDATE nodes SET sort_order = ?, updated_at = ? WHERE id = ?",
                params![update.order, &now, update.id.to_string()],
            )?;
        }

        if updated < 2 {
            tx.rollback()?;
            return Ok(false);
        }
        tx.commit()?;
        Ok(true)
    }
}

impl NodeStore for Database {
    fn list_all(&self) -> Result<Vec<Node>> {
        self.get_all_nodes()
    }

    fn get_by_id(&self, id: Uuid) -> Result<Option<Node>> {
        self.get_node(id)
    }

    fn list_children(&self, parent_id: Option<Uuid>) -> Result<Vec<Node>> {
        self.get_children(parent_id)
    }

    fn create(&self, node: NewNode) -> Result<Node> {
        self.create_node(node)
    }

    fn update_fields(&self, id: Uuid, input: UpdateNodeInput) -> Result<Option<Node>> {
        self.update_node(id, input)
    }

    fn update_checked<F>(&self, id: Uuid, prepare: F) -> HierarchyResult<Option<Node>>
    where
        F: FnOnce(&[Node]) -> HierarchyResult<UpdateNodeInput>,
    {
        self.update_node_checked(id, prepare)
    }

    fn delete_cascade(&self, id: Uuid) -> Result<bool> {
        self.delete_node(id)
    }

    fn swap_orders(&self, first: OrderUpdate, second: OrderUpdate) -> Result<bool> {
        self.swap_node_orders(first, second)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

fn query_all(conn: &Connection) -> Result<Vec<Node>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NODE_COLUMNS} FROM nodes ORDER BY sort_order, created_at, id"
    ))?;

    let nodes = stmt
        .query_map([], node_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(nodes)
}

/// Merge `input` over the stored row and write it back. `None` if the node
/// does not exist.
fn apply_update(conn: &Connection, id: Uuid, input: UpdateNodeInput) -> Result<Option<Node>> {
    let Some(existing) = query_node(conn, id)? else {
        return Ok(None);
    };

    let node = Node {
        id,
        parent_id: input.parent_id.unwrap_or(existing.parent_id),
        title: input.title.unwrap_or(existing.title),
        description: input.description.unwrap_or(existing.description),
        node_type: input.node_type.unwrap_or(existing.node_type),
        status: input.status.unwrap_or(existing.status),
        priority: input.priority.unwrap_or(existing.priority),
        order: input.order.unwrap_or(existing.order),
        organization_id: input.organization_id.unwrap_or(existing.organization_id),
        assignee_id: input.assignee_id.unwrap_or(existing.assignee_id),
        due_date: input.due_date.unwrap_or(existing.due_date),
        started_at: input.started_at.unwrap_or(existing.started_at),
        completed_at: input.completed_at.unwrap_or(existing.completed_at),
        estimated_points: input.estimated_points.unwrap_or(existing.estimated_points),
        estimated_hours: input.estimated_hours.unwrap_or(existing.estimated_hours),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    conn.execute(
        "UPDATE nodes SET parent_id = ?, title = ?, description = ?, node_type = ?, status = ?,
             priority = ?, sort_order = ?, organization_id = ?, assignee_id = ?, due_date = ?,
             started_at = ?, completed_at = ?, estimated_points = ?, estimated_hours = ?,
             updated_at = ?
         WHERE id = ?",
        params![
            node.parent_id.map(|u| u.to_string()),
            &node.title,
            &node.description,
            node.node_type.as_str(),
            node.status.as_str(),
            node.priority.as_str(),
            node.order,
            node.organization_id.map(|u| u.to_string()),
            node.assignee_id.map(|u| u.to_string()),
            node.due_date.map(|d| d.to_rfc3339()),
            node.started_at.map(|d| d.to_rfc3339()),
            node.completed_at.map(|d| d.to_rfc3339()),
            node.estimated_points,
            node.estimated_hours,
            node.updated_at.to_rfc3339(),
            id.to_string(),
        ],
    )?;

    Ok(Some(node))
}

fn query_node(conn: &Connection, id: Uuid) -> Result<Option<Node>> {
    let node = conn
        .query_row(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?"),
            [id.to_string()],
            node_from_row,
        )
        .optional()?;
    Ok(node)
}

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: parse_uuid(row.get::<_, String>(0)?),
        parent_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
        title: row.get(2)?,
        description: row.get(3)?,
        node_type: NodeType::from_str(&row.get::<_, String>(4)?).unwrap_or(NodeType::Feature),
        status: NodeStatus::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        priority: NodePriority::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
        order: row.get(7)?,
        organization_id: row.get::<_, Option<String>>(8)?.map(parse_uuid),
        assignee_id: row.get::<_, Option<String>>(9)?.map(parse_uuid),
        due_date: row.get::<_, Option<String>>(10)?.map(parse_datetime),
        started_at: row.get::<_, Option<String>>(11)?.map(parse_datetime),
        completed_at: row.get::<_, Option<String>>(12)?.map(parse_datetime),
        estimated_points: row.get(13)?,
        estimated_hours: row.get(14)?,
        created_at: parse_datetime(row.get::<_, String>(15)?),
        updated_at: parse_datetime(row.get::<_, String>(16)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
