//! Memory core: data model, classifier, probes, recall, risks,
//! consolidation, and the engine that orchestrates them

pub mod consolidation;
pub mod engine;
pub mod probes;
pub mod recall;
pub mod risks;
pub mod tagging;
pub mod types;

pub use engine::{MemoryEngine, WriteContext};
pub use tagging::{classify, labels};
pub use types::{
    ConsolidationReport, Memory, MemoryId, MemoryMetadata, MemorizeOutcome, RankedMemory,
};
