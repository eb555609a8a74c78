mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::hierarchy::Hierarchy;

pub type AppState = Hierarchy<Database>;

pub fn create_router(hierarchy: AppState) -> Router {
    let api = Router::new()
        // Nodes
        .route("/nodes", get(handlers::list_nodes).post(handlers::create_node))
        .route("/nodes/tree", get(handlers::get_tree))
        .route("/nodes/normalize", post(handlers::normalize_orders))
        .route(
            "/nodes/{id}",
            get(handlers::get_node)
                .patch(handlers::update_node)
                .delete(handlers::delete_node),
        )
        .route("/nodes/{id}/children", get(handlers::list_children))
        .route("/nodes/{id}/allowed-children", get(handlers::allowed_children))
        .route("/nodes/{id}/move", post(handlers::move_node))
        .route("/nodes/{id}/reorder", post(handlers::reorder_node))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(hierarchy)
}
