//! Documented constants for the memory engine
//!
//! Every tunable threshold lives here with the reasoning behind its value.
//! Centralizing them prevents magic numbers and makes tuning auditable.

// =============================================================================
// SIMILARITY THRESHOLDS
// Distances are cosine distances from the vector backend: lower = more
// similar, 0 = identical, ~1.0 = unrelated, 2.0 = opposite.
// =============================================================================

/// Identity threshold for the duplicate guard.
///
/// A nearest neighbor closer than this is treated as "already known": the
/// write is suppressed and the existing id is surfaced to the caller.
/// 0.2 tolerates trivial rephrasing (whitespace, punctuation) while keeping
/// genuinely new content out of the suppression zone.
pub const DUPLICATE_DISTANCE: f32 = 0.2;

/// Floor below which a neighbor is considered near-identical rather than
/// conflicting. The conflict detector never flags entries at or under this
/// distance; they belong to the duplicate guard's territory.
pub const NEAR_IDENTICAL_DISTANCE: f32 = 0.1;

/// Relaxed ceiling for the conflict detector.
///
/// Decision/config content whose nearest neighbor falls strictly between
/// [`DUPLICATE_DISTANCE`] and this value is flagged as a potential conflict
/// (similar topic, different statement). Beyond 0.8 the entries are simply
/// about different things.
pub const CONFLICT_DISTANCE: f32 = 0.8;

/// Default recall threshold. Results farther than this are dropped
/// (inclusive pass at equality). 1.8 keeps everything but true outliers on
/// a backend where unrelated texts land near 1.0.
pub const RECALL_DISTANCE: f32 = 1.8;

/// Synthetic distance assigned to interlink-expansion results so they always
/// rank after genuine semantic hits. 1.9 sits past the default recall
/// threshold on purpose: expansion entries bypass the filter.
pub const INTERLINK_DISTANCE: f32 = 1.9;

/// Number of neighbors requested by the secondary interlink query.
pub const INTERLINK_RESULTS: usize = 3;

/// Lexical rerank window: only entries strictly closer than this to the top
/// result are eligible for the exact-substring bonus. Keeps the rerank from
/// reshuffling entries that were never close contenders.
pub const RERANK_WINDOW: f32 = 0.3;

/// Distance bonus subtracted when the literal query string occurs in an
/// entry's content. Small enough to reorder only near-ties.
pub const RERANK_BONUS: f32 = 0.1;

/// Minimum result count before the lexical rerank pass runs at all.
pub const RERANK_MIN_RESULTS: usize = 3;

// =============================================================================
// CONSOLIDATION
// =============================================================================

/// Memories shorter than this (in characters) are purge candidates unless
/// protected by a structural tag. 30 chars is below any useful statement
/// ("ok", "done", stray tool output).
pub const PURGE_MIN_CONTENT_CHARS: usize = 30;

/// A project needs strictly more members than this before a snapshot is
/// synthesized. Ten memories summarize into nothing worth storing.
pub const SNAPSHOT_MIN_GROUP: usize = 10;

/// Maximum highlight excerpts pulled into a snapshot from
/// decision/system-error/architecture entries.
pub const SNAPSHOT_MAX_HIGHLIGHTS: usize = 5;

/// Number of chronological members digested into a snapshot.
pub const SNAPSHOT_DIGEST_MEMBERS: usize = 10;

/// Truncation length for each digest line.
pub const SNAPSHOT_DIGEST_CHARS: usize = 100;

// =============================================================================
// MISC LIMITS
// =============================================================================

/// Default number of neighbors requested by recall.
pub const DEFAULT_RECALL_LIMIT: usize = 5;

/// Upper bound passed to `get_all` during consolidation and listing.
pub const GET_ALL_LIMIT: usize = 10_000;

/// Excerpt length used by risk messages and conflict logs.
pub const EXCERPT_CHARS: usize = 80;

/// Embedding dimensionality of the local reference backend.
pub const EMBEDDING_DIM: usize = 256;
