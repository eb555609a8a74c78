use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::AppState;
use crate::error::HierarchyError;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Map a hierarchy error to a response.
///
/// Validation rejections are safe to expose and come back as BAD_REQUEST.
/// Storage failures are logged in full server-side, but clients only see a
/// generic message.
fn hierarchy_error(e: HierarchyError) -> (StatusCode, String) {
    if e.is_not_found() {
        return (StatusCode::NOT_FOUND, e.to_string());
    }

    if e.is_validation() {
        tracing::warn!("Validation error: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string());
    }

    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Nodes
// ============================================================

pub async fn list_nodes(
    State(hierarchy): State<AppState>,
) -> Result<Json<Vec<Node>>, (StatusCode, String)> {
    hierarchy.list_nodes().map(Json).map_err(hierarchy_error)
}

pub async fn get_tree(
    State(hierarchy): State<AppState>,
) -> Result<Json<Vec<NodeTreeNode>>, (StatusCode, String)> {
    hierarchy.forest().map(Json).map_err(hierarchy_error)
}

pub async fn get_node(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Node>, (StatusCode, String)> {
    hierarchy.get_node(id).map(Json).map_err(hierarchy_error)
}

pub async fn list_children(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Node>>, (StatusCode, String)> {
    hierarchy
        .children(Some(id))
        .map(Json)
        .map_err(hierarchy_error)
}

pub async fn allowed_children(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NodeType>>, (StatusCode, String)> {
    hierarchy
        .allowed_children(id)
        .map(|types| Json(types.to_vec()))
        .map_err(hierarchy_error)
}

pub async fn create_node(
    State(hierarchy): State<AppState>,
    Json(input): Json<CreateNodeInput>,
) -> Result<(StatusCode, Json<Node>), (StatusCode, String)> {
    hierarchy
        .create_node(input)
        .map(|n| (StatusCode::CREATED, Json(n)))
        .map_err(hierarchy_error)
}

pub async fn update_node(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateNodeInput>,
) -> Result<Json<Node>, (StatusCode, String)> {
    hierarchy
        .update_node(id, input)
        .map(Json)
        .map_err(hierarchy_error)
}

pub async fn move_node(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<MoveInput>,
) -> Result<Json<Node>, (StatusCode, String)> {
    hierarchy
        .move_node(id, input.parent_id)
        .map(Json)
        .map_err(hierarchy_error)
}

pub async fn reorder_node(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReorderInput>,
) -> Result<Json<ReorderResult>, (StatusCode, String)> {
    hierarchy
        .move_one_step(id, input.direction)
        .map(|swap| {
            Json(ReorderResult {
                moved: swap.is_some(),
                swap,
            })
        })
        .map_err(hierarchy_error)
}

pub async fn normalize_orders(
    State(hierarchy): State<AppState>,
) -> Result<Json<Vec<OrderUpdate>>, (StatusCode, String)> {
    hierarchy.normalize().map(Json).map_err(hierarchy_error)
}

pub async fn delete_node(
    State(hierarchy): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    hierarchy
        .delete_node(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(hierarchy_error)
}
