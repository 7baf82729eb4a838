//! Consolidation and risk-report handlers

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::router::AppState;
use super::types::{ConsolidateResponse, RisksResponse};
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::validation;

/// Run the consolidation batch job: purge stubs, synthesize snapshots.
#[tracing::instrument(skip(state))]
pub async fn consolidate(State(state): State<AppState>) -> Result<Json<ConsolidateResponse>> {
    let report = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.engine.consolidate())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?
    };

    Ok(Json(ConsolidateResponse { report }))
}

/// Unresolved-bug and technical-debt findings for one project.
#[tracing::instrument(skip(state))]
pub async fn risks(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> Result<Json<RisksResponse>> {
    validation::validate_project(&project).map_validation_err("project")?;

    let findings = {
        let state = state.clone();
        let project = project.clone();
        tokio::task::spawn_blocking(move || state.engine.risks(&project))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?
    };

    let total = findings.len();
    Ok(Json(RisksResponse { project, findings, total }))
}
