//! Read-path handlers

use axum::{extract::State, response::Json};

use super::router::AppState;
use super::types::{RecallRequest, RecallResponse, RecallResult};
use crate::constants::DEFAULT_RECALL_LIMIT;
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::validation;

/// Ranked semantic recall.
#[tracing::instrument(skip(state, req))]
pub async fn recall(
    State(state): State<AppState>,
    Json(req): Json<RecallRequest>,
) -> Result<Json<RecallResponse>> {
    validation::validate_query(&req.query).map_validation_err("query")?;

    let limit = req.limit.unwrap_or(DEFAULT_RECALL_LIMIT);
    let ranked = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.engine.recall(&req.query, limit, req.threshold))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?
    };

    let results: Vec<RecallResult> = ranked.into_iter().map(Into::into).collect();
    let total = results.len();
    Ok(Json(RecallResponse { results, total }))
}
