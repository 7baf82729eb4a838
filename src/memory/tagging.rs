//! Keyword-rule tag classifier
//!
//! A fixed, ordered table of `{label, keyword-set}` rules; a label applies
//! when any keyword occurs as a case-insensitive substring of the text.
//! Pure and deterministic: no I/O, nothing here can fail. Keyword sets
//! carry both English and Vietnamese terms; the deployed agents write both.

/// Tag labels used across the engine.
pub mod labels {
    pub const CODE_SNIPPET: &str = "code-snippet";
    pub const DECISION: &str = "decision";
    pub const SYSTEM_ERROR: &str = "system-error";
    pub const ARCHITECTURE: &str = "architecture";
    pub const USER_PROFILE: &str = "user-profile";
    pub const SECRET_CONFIG: &str = "secret-config";
    pub const SNAPSHOT: &str = "snapshot";
    pub const MILESTONE: &str = "milestone";
}

/// Fenced code marker; its own rule group since it is structural, not
/// lexical.
const FENCE_MARKER: &str = "```";

/// Ordered rule table. Order is fixed so derived tag vectors are stable
/// across runs; every group is evaluated independently.
const RULES: &[(&str, &[&str])] = &[
    (
        labels::DECISION,
        &[
            "decided", "decision", "choose", "chose", "we will use", "switch to",
            "quyết định", "chốt", "sẽ dùng", "chọn",
        ],
    ),
    (
        labels::SYSTEM_ERROR,
        &[
            "error", "exception", "crash", "panic", "stack trace", "bug",
            "lỗi", "sập", "hỏng",
        ],
    ),
    (
        labels::ARCHITECTURE,
        &[
            "architecture", "schema", "module layout", "service boundary", "design doc",
            "data flow", "kiến trúc", "thiết kế",
        ],
    ),
    (
        labels::USER_PROFILE,
        &[
            "prefers", "i prefer", "always use", "never use", "my name is",
            "thích", "không thích", "thói quen",
        ],
    ),
    (
        labels::SECRET_CONFIG,
        &[
            "password", "passwd", "secret", "token", "api key", "apikey",
            "credential", "connection string", "mật khẩu", "khóa api",
        ],
    ),
];

/// Derive category labels for `text`. Zero, one, or several labels may
/// apply; the output preserves rule-table order and never duplicates.
pub fn classify(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tags = Vec::new();

    if lowered.contains(FENCE_MARKER) {
        tags.push(labels::CODE_SNIPPET.to_string());
    }

    for (label, keywords) in RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            tags.push((*label).to_string());
        }
    }

    tags
}

/// Merge classifier output with caller-supplied labels, collapsing
/// duplicates while preserving first-seen order.
pub fn merge_tags(derived: Vec<String>, supplied: &[String]) -> Vec<String> {
    let mut merged = derived;
    for tag in supplied {
        let tag = tag.trim();
        if !tag.is_empty() && !merged.iter().any(|t| t == tag) {
            merged.push(tag.to_string());
        }
    }
    merged
}

/// Recognizable technology names for the tech-stack inference.
const TECH_KEYWORDS: &[&str] = &[
    "rust", "python", "typescript", "javascript", "react", "vue", "axum",
    "tokio", "postgresql", "postgres", "mysql", "sqlite", "redis", "mongodb",
    "docker", "kubernetes", "kafka", "grpc", "graphql", "tauri",
];

/// Comma-joined inference of surrounding technology, or `None` when nothing
/// was recognized.
pub fn infer_tech_stack(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let mut found: Vec<&str> = Vec::new();
    for tech in TECH_KEYWORDS {
        if lowered.contains(tech) && !found.iter().any(|f| f.contains(tech) || tech.contains(f)) {
            found.push(tech);
        }
    }

    if found.is_empty() {
        None
    } else {
        Some(found.join(", "))
    }
}

/// First line of the first fenced code block, truncated, when one exists.
pub fn snippet_preview(text: &str) -> Option<String> {
    let after_fence = text.split_once(FENCE_MARKER)?.1;
    // Skip the language hint line if the fence carries one
    let body = after_fence.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    let first_line = body.lines().find(|l| !l.trim().is_empty())?;
    Some(first_line.trim().chars().take(crate::constants::EXCERPT_CHARS).collect())
}
