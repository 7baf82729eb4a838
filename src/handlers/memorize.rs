//! Write-path handlers

use axum::{extract::State, response::Json};

use super::router::AppState;
use super::types::{MemorizeRequest, MemorizeResponse};
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::memory::WriteContext;
use crate::validation;

/// Memorize free text: classify, guard, flag, encrypt, store.
#[tracing::instrument(skip(state, req), fields(project = %req.project))]
pub async fn memorize(
    State(state): State<AppState>,
    Json(req): Json<MemorizeRequest>,
) -> Result<Json<MemorizeResponse>> {
    if req.content.trim().is_empty() {
        return Err(AppError::MissingContent);
    }
    validation::validate_content(&req.content).map_validation_err("content")?;
    validation::validate_tags(&req.tags).map_validation_err("tags")?;

    let ctx = WriteContext { project: req.project, path: req.path };
    let outcome = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.engine.memorize(&req.content, &req.tags, &ctx))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?
    };

    Ok(Json(MemorizeResponse {
        id: outcome.id.to_string(),
        created: outcome.created,
        tags: outcome.tags,
        potential_conflict_with: outcome.conflict_with.map(|id| id.to_string()),
    }))
}
