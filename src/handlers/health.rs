//! Health endpoint

use axum::{extract::State, response::Json};

use super::router::AppState;
use super::types::HealthResponse;

/// Liveness with version and store size.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memories: state.engine.len(),
    })
}
