//! Structured error types shared by the HTTP surface and the CLI
//!
//! Internal heuristic steps (tagging, probes, reranking) never raise; they
//! only annotate or filter. Everything here covers collaborator failures and
//! bad input, which do propagate to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application error taxonomy: storage backend, key service, bad input
#[derive(Debug)]
pub enum AppError {
    // Validation errors (400)
    InvalidInput { field: String, reason: String },
    InvalidMemoryId(String),
    MissingContent,
    MissingMemoryId,

    // Not found (404)
    MemoryNotFound(String),

    // Internal errors (500)
    StoreError(String),
    EncryptionError(String),
    KeyUnavailable(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Machine-readable code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidMemoryId(_) => "INVALID_MEMORY_ID",
            Self::MissingContent => "MISSING_CONTENT",
            Self::MissingMemoryId => "MISSING_MEMORY_ID",
            Self::MemoryNotFound(_) => "MEMORY_NOT_FOUND",
            Self::StoreError(_) => "STORE_ERROR",
            Self::EncryptionError(_) => "ENCRYPTION_ERROR",
            Self::KeyUnavailable(_) => "KEY_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. }
            | Self::InvalidMemoryId(_)
            | Self::MissingContent
            | Self::MissingMemoryId => StatusCode::BAD_REQUEST,

            Self::MemoryNotFound(_) => StatusCode::NOT_FOUND,

            Self::StoreError(_)
            | Self::EncryptionError(_)
            | Self::KeyUnavailable(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::InvalidMemoryId(msg) => format!("Invalid memory id: {msg}"),
            Self::MissingContent => "No content to memorize".to_string(),
            Self::MissingMemoryId => "No memory id given".to_string(),
            Self::MemoryNotFound(id) => format!("Memory not found: {id}"),
            Self::StoreError(msg) => format!("Vector store error: {msg}"),
            Self::EncryptionError(msg) => format!("Encryption error: {msg}"),
            Self::KeyUnavailable(msg) => format!("Encryption key unavailable: {msg}"),
            Self::Internal(err) => format!("Internal error: {err}"),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message(),
            details: None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

/// Helper trait to map validation failures onto `InvalidInput`
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
