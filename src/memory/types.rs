//! Type definitions for the memory engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for memories
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)] // Serialize as plain UUID string, not array
pub struct MemoryId(pub Uuid);

impl MemoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived metadata stored next to each memory's content.
///
/// Immutable after creation: the engine has no in-place edit path, only
/// deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Creation instant; RFC3339 serialization keeps it ISO-ordered.
    pub timestamp: DateTime<Utc>,

    /// Project of the invocation context that created the memory.
    pub project: String,

    /// Working path of the invocation context.
    pub path: String,

    /// Category labels: classifier output merged with caller-supplied
    /// labels, duplicates collapsed. May be empty.
    ///
    /// No serde skip attributes anywhere in this struct: records round-trip
    /// through bincode, which is not self-describing.
    pub tags: Vec<String>,

    /// Comma-joined inference of surrounding technology, when any was
    /// recognized in the content.
    pub tech_stack: Option<String>,

    /// Present when the content carries a fenced code block.
    pub has_code: bool,

    /// First line of the fenced block, truncated.
    pub snippet_preview: Option<String>,

    /// Weak reference to a prior memory the conflict detector judged
    /// similar-but-different. A relation, not an ownership link.
    pub potential_conflict_with: Option<MemoryId>,

    /// Only on synthesized snapshot memories: how many source memories the
    /// snapshot summarizes.
    pub summary_of_count: Option<usize>,
}

impl MemoryMetadata {
    pub fn new(project: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            project: project.into(),
            path: path.into(),
            tags: Vec::new(),
            tech_stack: None,
            has_code: false,
            snippet_preview: None,
            potential_conflict_with: None,
            summary_of_count: None,
        }
    }

    /// Whether any of `labels` is present in this memory's tag set.
    pub fn has_any_tag(&self, labels: &[&str]) -> bool {
        self.tags.iter().any(|t| labels.contains(&t.as_str()))
    }
}

/// A memory as held in working form: id, plaintext content, metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub content: String,
    pub metadata: MemoryMetadata,
}

/// Outcome of a write through the memorize path.
#[derive(Debug, Clone, Serialize)]
pub struct MemorizeOutcome {
    pub id: MemoryId,

    /// False when the duplicate guard suppressed the write and `id` is the
    /// prior entry's.
    pub created: bool,

    /// Tags attached to the new memory (empty when not created).
    pub tags: Vec<String>,

    /// Set when the conflict detector flagged a similar-but-distinct prior
    /// entry.
    pub conflict_with: Option<MemoryId>,
}

/// Relation of a recall result to the query.
pub mod relation {
    /// The closest match (index 0 after ranking).
    pub const PRIMARY: &str = "primary match";

    /// Any other threshold-passing neighbor.
    pub const SEMANTIC: &str = "semantic match";

    /// Label for an interlink-expansion entry produced by `tag`.
    pub fn linked_via(tag: &str) -> String {
        format!("linked via tag '{tag}'")
    }
}

/// One ranked recall result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMemory {
    pub id: MemoryId,

    /// Decrypted content.
    pub content: String,

    pub metadata: MemoryMetadata,

    /// Backend distance, possibly adjusted by the lexical rerank; interlink
    /// entries carry the fixed synthetic distance.
    pub distance: f32,

    /// "primary match", "semantic match", or a tag-derived label.
    pub relation: String,
}

/// Report returned by a consolidation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsolidationReport {
    /// Stub memories removed by the purge phase.
    pub purged: usize,

    /// Snapshot memories synthesized this run.
    pub snapshots_created: usize,

    /// Projects skipped because a snapshot already existed.
    pub projects_already_consolidated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_id_serializes_as_plain_string() {
        let id = MemoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[test]
    fn test_metadata_round_trip() {
        let mut meta = MemoryMetadata::new("demo", "/work/demo");
        meta.tags = vec!["decision".to_string()];
        meta.summary_of_count = Some(11);

        let bytes = bincode::serialize(&meta).unwrap();
        let back: MemoryMetadata = bincode::deserialize(&bytes).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_has_any_tag() {
        let mut meta = MemoryMetadata::new("demo", "/");
        meta.tags = vec!["decision".to_string(), "secret-config".to_string()];
        assert!(meta.has_any_tag(&["decision", "architecture"]));
        assert!(!meta.has_any_tag(&["milestone"]));
    }

    #[test]
    fn test_timestamps_iso_order() {
        let a = MemoryMetadata::new("p", "/");
        let b = MemoryMetadata::new("p", "/");
        // RFC3339 strings sort the same way the instants do
        assert!(a.timestamp.to_rfc3339() <= b.timestamp.to_rfc3339());
    }
}
