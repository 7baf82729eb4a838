//! List / delete / update handlers over individual memories

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::router::AppState;
use super::types::{
    DeleteMemoryResponse, ListMemoryItem, ListQuery, ListResponse, UpdateMemoryResponse,
};
use crate::constants::GET_ALL_LIMIT;
use crate::errors::{AppError, Result, ValidationErrorExt};
use crate::memory::MemoryId;
use crate::validation;

/// List all memories as `{id, content, metadata}` records, content
/// decrypted on the way out.
#[tracing::instrument(skip(state))]
pub async fn list_memories(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let limit = params.limit.unwrap_or(GET_ALL_LIMIT);

    let memories = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.engine.list())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?
    };

    let items: Vec<ListMemoryItem> = memories
        .into_iter()
        .take(limit)
        .map(|m| ListMemoryItem {
            id: m.id.to_string(),
            content: m.content,
            metadata: m.metadata,
        })
        .collect();

    let total = items.len();
    Ok(Json(ListResponse { memories: items, total }))
}

/// Delete one memory by id. Deleting an id that was never present is
/// indistinguishable from deleting one that was.
#[tracing::instrument(skip(state))]
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteMemoryResponse>> {
    let uuid = validation::validate_memory_id(&id)
        .map_err(|e| AppError::InvalidMemoryId(e.to_string()))?;
    let memory_id = MemoryId(uuid);

    {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.engine.forget(&memory_id))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
            .map_err(AppError::Internal)?;
    }

    Ok(Json(DeleteMemoryResponse {
        success: true,
        id,
        message: "memory deleted".to_string(),
    }))
}

/// Update-by-id: acknowledged, performs no mutation. Memories are immutable
/// after creation; there is no in-place edit path in the engine.
#[tracing::instrument(skip(state))]
pub async fn update_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateMemoryResponse>> {
    validation::validate_memory_id(&id).map_validation_err("id")?;
    let _ = state; // no engine call: update is not implemented

    Ok(Json(UpdateMemoryResponse {
        success: false,
        id,
        message: "update is not implemented; memories are immutable after creation".to_string(),
    }))
}
