//! Engine integration tests: write path, probes, forget, persistence
//!
//! Run with: `cargo test --test engine_tests`

use tempfile::TempDir;

use hippo_memory::config::EngineConfig;
use hippo_memory::memory::{MemoryEngine, MemoryId, WriteContext};

fn setup_engine() -> (MemoryEngine, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let engine =
        MemoryEngine::open(EngineConfig::with_storage_path(dir.path())).expect("open engine");
    (engine, dir)
}

fn ctx(project: &str) -> WriteContext {
    WriteContext { project: project.to_string(), path: format!("/work/{project}") }
}

// =============================================================================
// WRITE PATH
// =============================================================================

#[test]
fn test_memorize_assigns_unique_ids() {
    let (engine, _dir) = setup_engine();

    let a = engine
        .memorize("the staging cluster lives in eu-west-1", &[], &ctx("infra"))
        .unwrap();
    let b = engine
        .memorize("the review app builds from the feature branch", &[], &ctx("infra"))
        .unwrap();

    assert!(a.created && b.created);
    assert_ne!(a.id, b.id);
    assert_eq!(engine.len(), 2);
}

#[test]
fn test_duplicate_guard_is_idempotent() {
    let (engine, _dir) = setup_engine();
    let text = "nightly importer runs at 03:00 UTC and takes about eight minutes";

    let first = engine.memorize(text, &[], &ctx("etl")).unwrap();
    let second = engine.memorize(text, &[], &ctx("etl")).unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_caller_tags_are_merged_and_deduplicated() {
    let (engine, _dir) = setup_engine();

    let outcome = engine
        .memorize(
            "decided to keep the legacy importer until Q4",
            &["decision".to_string(), "legacy".to_string()],
            &ctx("etl"),
        )
        .unwrap();

    let decision_count = outcome.tags.iter().filter(|t| *t == "decision").count();
    assert_eq!(decision_count, 1);
    assert!(outcome.tags.contains(&"legacy".to_string()));
}

#[test]
fn test_conflicting_secrets_both_persist() {
    let (engine, _dir) = setup_engine();

    let first = engine.memorize("deploy token mới: xyz123", &[], &ctx("ops")).unwrap();
    let second = engine.memorize("deploy token mới: abc999", &[], &ctx("ops")).unwrap();

    assert!(first.created);
    assert!(second.created, "conflict must not block the write");
    assert_eq!(second.conflict_with, Some(first.id), "second entry should flag the first");
    assert_eq!(engine.len(), 2);

    let listed = engine.list().unwrap();
    let flagged = listed
        .iter()
        .find(|m| m.metadata.potential_conflict_with.is_some())
        .expect("one memory carries the conflict annotation");
    assert_eq!(flagged.content, "deploy token mới: abc999");
}

#[test]
fn test_unrelated_decisions_are_not_flagged() {
    let (engine, _dir) = setup_engine();

    engine
        .memorize("Quyết định: dùng PostgreSQL cho database chính.", &[], &ctx("app"))
        .unwrap();
    let second = engine
        .memorize(
            "decided that all public endpoints return problem+json error bodies",
            &[],
            &ctx("app"),
        )
        .unwrap();

    assert!(second.conflict_with.is_none());
}

// =============================================================================
// FORGET / PERSISTENCE
// =============================================================================

#[test]
fn test_forget_removes_memory() {
    let (engine, _dir) = setup_engine();

    let outcome = engine
        .memorize("scratch note that will be deleted shortly", &[], &ctx("tmp"))
        .unwrap();
    engine.forget(&outcome.id).unwrap();

    assert!(engine.is_empty());
    assert!(engine.recall("scratch note", 5, None).unwrap().is_empty());
}

#[test]
fn test_forget_unknown_id_is_silent() {
    let (engine, _dir) = setup_engine();
    engine
        .memorize("a memory that must survive the stray delete", &[], &ctx("tmp"))
        .unwrap();

    engine.forget(&MemoryId::new()).unwrap();
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_memories_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let text = "Quyết định: chuyển hàng đợi nội bộ sang Redis streams";
    let id;
    {
        let engine =
            MemoryEngine::open(EngineConfig::with_storage_path(dir.path())).unwrap();
        id = engine.memorize(text, &[], &ctx("queue")).unwrap().id;
    }

    let engine = MemoryEngine::open(EngineConfig::with_storage_path(dir.path())).unwrap();
    assert_eq!(engine.len(), 1);

    let listed = engine.list().unwrap();
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].content, text, "content round-trips through the gateway");

    // The duplicate guard still recognizes the text under the reopened key
    let again = engine.memorize(text, &[], &ctx("queue")).unwrap();
    assert!(!again.created);
    assert_eq!(again.id, id);
}

// =============================================================================
// RISKS
// =============================================================================

#[test]
fn test_risks_are_scoped_to_project() {
    let (engine, _dir) = setup_engine();

    engine
        .memorize(
            "error: csv importer dies on files with a BOM header",
            &[],
            &ctx("etl"),
        )
        .unwrap();
    engine
        .memorize(
            "temporary workaround: retry the webhook three times before giving up",
            &[],
            &ctx("billing"),
        )
        .unwrap();

    let etl = engine.risks("etl").unwrap();
    assert_eq!(etl.len(), 1);
    assert!(etl[0].starts_with("unresolved bug:"));

    let billing = engine.risks("billing").unwrap();
    assert_eq!(billing.len(), 1);
    assert!(billing[0].starts_with("technical debt:"));

    assert!(engine.risks("unknown-project").unwrap().is_empty());
}
