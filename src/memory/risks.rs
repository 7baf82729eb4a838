//! Risk analyzer: unresolved-bug and technical-debt signals
//!
//! Order-preserving scan over a project's memories. Emits one message per
//! finding, not deduplicated; a memory can contribute both an unresolved
//! bug and a debt marker. Pure; nothing here raises.

use crate::constants::EXCERPT_CHARS;
use crate::memory::tagging::labels;
use crate::memory::types::Memory;

/// Keywords that mark an error memory as dealt with.
const RESOLUTION_KEYWORDS: &[&str] = &[
    "fixed", "resolved", "done", "closed", "patched", "đã sửa", "đã fix", "xong",
];

/// Markers of deferred work living in content of any tag.
const DEBT_MARKERS: &[&str] = &[
    "temporary", "workaround", "todo", "fixme", "hack", "later", "tạm thời", "để sau",
];

/// Scan `memories` (plaintext content) for risk signals, preserving input
/// order.
pub fn risks(memories: &[Memory]) -> Vec<String> {
    let mut findings = Vec::new();

    for memory in memories {
        let lowered = memory.content.to_lowercase();

        if memory.metadata.has_any_tag(&[labels::SYSTEM_ERROR])
            && !RESOLUTION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        {
            findings.push(format!("unresolved bug: {}", excerpt(&memory.content)));
        }

        if DEBT_MARKERS.iter().any(|kw| lowered.contains(kw)) {
            findings.push(format!("technical debt: {}", excerpt(&memory.content)));
        }
    }

    findings
}

fn excerpt(content: &str) -> String {
    let mut cut: String = content.chars().take(EXCERPT_CHARS).collect();
    if cut.len() < content.len() {
        cut.push('…');
    }
    cut
}
