//! Router configuration: centralized route definitions and shared state

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{consolidation, crud, health, memorize, recall};
use crate::memory::MemoryEngine;

/// Shared server state: the engine, already opened.
pub struct ServerState {
    pub engine: MemoryEngine,
}

/// Application state type alias
pub type AppState = Arc<ServerState>;

/// Build the full router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Write path
        .route("/api/memories", post(memorize::memorize))
        // Read path
        .route("/api/recall", post(recall::recall))
        // Dashboard surface
        .route("/api/memories", get(crud::list_memories))
        .route("/api/memories/{id}", delete(crud::delete_memory))
        .route("/api/memories/{id}", put(crud::update_memory))
        // Batch jobs and reports
        .route("/api/consolidate", post(consolidation::consolidate))
        .route("/api/risks/{project}", get(consolidation::risks))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Engine calls run on the blocking pool; cap in-flight requests so a
        // burst cannot exhaust it
        .layer(ConcurrencyLimitLayer::new(256))
        .with_state(state)
}
