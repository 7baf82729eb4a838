//! Hippo-Memory Library
//!
//! Per-user semantic memory engine for autonomous agents: free-text
//! memories enriched with derived tags, deduplicated and conflict-flagged
//! at write time, recalled by meaning with tag interlinking and lexical
//! reranking, and periodically consolidated into durable snapshots.
//!
//! The engine orchestrates two collaborators behind narrow seams:
//! - a vector similarity backend (`vector_store::VectorStore`, with a local
//!   brute-force reference implementation)
//! - a content encryption gateway (`crypto::CryptoGateway`, AES-256-GCM with
//!   graceful passthrough of legacy plaintext)

pub mod config;
pub mod constants;
pub mod crypto;
pub mod embedding;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod validation;
pub mod vector_store;

// Re-export dependencies so tests use the same versions
pub use chrono;
pub use uuid;
