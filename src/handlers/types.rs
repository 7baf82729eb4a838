//! Request and response types shared by the HTTP handlers

use serde::{Deserialize, Serialize};

use crate::memory::types::{ConsolidationReport, MemoryMetadata, RankedMemory};

// =============================================================================
// MEMORIZE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct MemorizeRequest {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct MemorizeResponse {
    pub id: String,
    /// False when the duplicate guard surfaced an existing entry instead.
    pub created: bool,
    pub tags: Vec<String>,
    pub potential_conflict_with: Option<String>,
}

// =============================================================================
// RECALL
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RecallRequest {
    pub query: String,
    pub limit: Option<usize>,
    /// Distance cutoff override; engine default when absent.
    pub threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct RecallResponse {
    pub results: Vec<RecallResult>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct RecallResult {
    pub id: String,
    pub content: String,
    pub metadata: MemoryMetadata,
    pub distance: f32,
    pub relation: String,
}

impl From<RankedMemory> for RecallResult {
    fn from(ranked: RankedMemory) -> Self {
        Self {
            id: ranked.id.to_string(),
            content: ranked.content,
            metadata: ranked.metadata,
            distance: ranked.distance,
            relation: ranked.relation,
        }
    }
}

// =============================================================================
// LIST / DELETE / UPDATE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub memories: Vec<ListMemoryItem>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListMemoryItem {
    pub id: String,
    pub content: String,
    pub metadata: MemoryMetadata,
}

#[derive(Debug, Serialize)]
pub struct DeleteMemoryResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

/// Update-by-id is acknowledged but performs no mutation; the response says
/// so instead of pretending.
#[derive(Debug, Serialize)]
pub struct UpdateMemoryResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

// =============================================================================
// CONSOLIDATE / RISKS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ConsolidateResponse {
    pub report: ConsolidationReport,
}

#[derive(Debug, Serialize)]
pub struct RisksResponse {
    pub project: String,
    pub findings: Vec<String>,
    pub total: usize,
}

// =============================================================================
// HEALTH
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub memories: usize,
}
