//! Consolidation: purge pass and snapshot synthesis
//!
//! The batch job that keeps a long-lived store useful: low-value stubs are
//! deleted, and noisy per-project history is compressed into one durable
//! snapshot memory written through the normal write path. Snapshots are
//! additive: source memories are never deleted, and an existing snapshot
//! suppresses synthesis for its project permanently.
//!
//! This module holds the pure decision logic; the engine drives it against
//! the store.

use std::collections::BTreeMap;

use crate::constants::{
    PURGE_MIN_CONTENT_CHARS, SNAPSHOT_DIGEST_CHARS, SNAPSHOT_DIGEST_MEMBERS,
    SNAPSHOT_MAX_HIGHLIGHTS, SNAPSHOT_MIN_GROUP,
};
use crate::memory::tagging::labels;
use crate::memory::types::Memory;

/// Tags that protect a short memory from the purge pass.
const PURGE_PROTECTED_TAGS: &[&str] = &[labels::DECISION, labels::ARCHITECTURE, labels::MILESTONE];

/// Tags drawn on for snapshot highlights.
const HIGHLIGHT_TAGS: &[&str] = &[labels::DECISION, labels::SYSTEM_ERROR, labels::ARCHITECTURE];

/// Whether a memory is a low-value stub: too short to matter and carrying
/// no structural tag. Length is in characters, not bytes, because the content is
/// frequently non-ASCII.
pub fn is_purge_candidate(memory: &Memory) -> bool {
    memory.content.chars().count() < PURGE_MIN_CONTENT_CHARS
        && !memory.metadata.has_any_tag(PURGE_PROTECTED_TAGS)
}

/// Group memories by project, each group in chronological order.
pub fn group_by_project(memories: Vec<Memory>) -> BTreeMap<String, Vec<Memory>> {
    let mut groups: BTreeMap<String, Vec<Memory>> = BTreeMap::new();
    for memory in memories {
        groups.entry(memory.metadata.project.clone()).or_default().push(memory);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.metadata.timestamp.cmp(&b.metadata.timestamp));
    }
    groups
}

/// Whether a project group warrants a snapshot this run: strictly more than
/// the minimum members, and no snapshot synthesized before.
pub fn needs_snapshot(group: &[Memory]) -> bool {
    group.len() > SNAPSHOT_MIN_GROUP
        && !group.iter().any(|m| m.metadata.has_any_tag(&[labels::SNAPSHOT]))
}

/// Build the snapshot summary document for a project group (plaintext
/// content, chronological order expected).
pub fn build_snapshot_document(project: &str, group: &[Memory]) -> String {
    let mut doc = format!("Project snapshot: {project}\n");

    let highlights: Vec<&Memory> = group
        .iter()
        .filter(|m| m.metadata.has_any_tag(HIGHLIGHT_TAGS))
        .take(SNAPSHOT_MAX_HIGHLIGHTS)
        .collect();

    if !highlights.is_empty() {
        doc.push_str("\nHighlights:\n");
        for memory in highlights {
            doc.push_str(&format!("- {}\n", truncate(&memory.content, SNAPSHOT_DIGEST_CHARS)));
        }
    }

    doc.push_str("\nHistory:\n");
    for memory in group.iter().take(SNAPSHOT_DIGEST_MEMBERS) {
        doc.push_str(&format!(
            "- [{}] {}\n",
            memory.metadata.timestamp.format("%Y-%m-%d"),
            truncate(&memory.content, SNAPSHOT_DIGEST_CHARS)
        ));
    }

    doc
}

fn truncate(content: &str, max_chars: usize) -> String {
    let flattened = content.replace('\n', " ");
    let mut cut: String = flattened.chars().take(max_chars).collect();
    if cut.chars().count() < flattened.chars().count() {
        cut.push('…');
    }
    cut
}
