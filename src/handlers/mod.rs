//! HTTP API handlers

pub mod router;
pub mod types;

pub mod consolidation;
pub mod crud;
pub mod health;
pub mod memorize;
pub mod recall;

pub use router::{build_router, AppState, ServerState};
pub use types::*;
