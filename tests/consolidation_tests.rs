//! Consolidation integration tests: purge phase and snapshot synthesis
//!
//! Run with: `cargo test --test consolidation_tests`

use tempfile::TempDir;

use hippo_memory::config::EngineConfig;
use hippo_memory::memory::{MemoryEngine, WriteContext};

fn setup_engine() -> (MemoryEngine, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let engine =
        MemoryEngine::open(EngineConfig::with_storage_path(dir.path())).expect("open engine");
    (engine, dir)
}

fn ctx(project: &str) -> WriteContext {
    WriteContext { project: project.to_string(), path: format!("/work/{project}") }
}

/// Eleven distinct, purge-proof memories for one project.
fn seed_project(engine: &MemoryEngine, project: &str) {
    let notes = [
        "the importer now retries failed batches three times before parking them",
        "decided to keep the read model in postgres instead of a separate cache",
        "error: the pdf renderer runs out of memory on files above forty pages",
        "switched the background queue to a single worker while debugging ordering",
        "customer feedback wants the export to include the archived records too",
        "the staging seed script takes four minutes, mostly spent on image fixtures",
        "api pagination defaults were lowered from one hundred to twenty five",
        "the email templates moved into the repository next to their previews",
        "weekly metrics review happens right after standup on wednesdays",
        "onboarding flow drops users who close the tab during the second step",
        "search indexing lags about thirty seconds behind writes on busy days",
    ];
    for note in notes {
        let outcome = engine.memorize(note, &[], &ctx(project)).unwrap();
        assert!(outcome.created, "seed note was unexpectedly deduplicated: {note}");
    }
}

// =============================================================================
// PURGE PHASE
// =============================================================================

#[test]
fn test_purge_removes_short_untagged_stubs() {
    let (engine, _dir) = setup_engine();

    engine.memorize("ok", &[], &ctx("demo")).unwrap();
    engine.memorize("done, see above", &[], &ctx("demo")).unwrap();
    engine
        .memorize("a proper note that is comfortably long enough to survive", &[], &ctx("demo"))
        .unwrap();

    let report = engine.consolidate().unwrap();
    assert_eq!(report.purged, 2);
    assert_eq!(engine.len(), 1);
    assert_eq!(report.snapshots_created, 0);
}

#[test]
fn test_purge_spares_protected_tags() {
    let (engine, _dir) = setup_engine();

    engine.memorize("dùng axum", &["decision".to_string()], &ctx("demo")).unwrap();
    engine.memorize("v1 shipped", &["milestone".to_string()], &ctx("demo")).unwrap();
    engine.memorize("kiến trúc: hexagonal", &[], &ctx("demo")).unwrap();
    engine.memorize("ok", &[], &ctx("demo")).unwrap();

    let report = engine.consolidate().unwrap();
    assert_eq!(report.purged, 1, "only the untagged stub goes");
    assert_eq!(engine.len(), 3);
}

// =============================================================================
// SNAPSHOT SYNTHESIS
// =============================================================================

#[test]
fn test_small_project_yields_no_snapshot() {
    let (engine, _dir) = setup_engine();

    let notes = [
        "the nightly backup finished in under two minutes again today",
        "support asked for a csv export of the audit trail",
        "renamed the internal service from gateway to frontdoor",
        "the contract tests moved into their own workflow file",
        "profiling shows most time is spent in template rendering",
        "the staging database was refreshed from the friday dump",
        "mobile clients older than version six are below one percent",
        "the retry queue drains completely within five minutes now",
        "translations for the settings screen arrived from the agency",
        "the load balancer health check interval was doubled",
    ];
    for note in notes {
        let outcome = engine.memorize(note, &[], &ctx("demo")).unwrap();
        assert!(outcome.created);
    }

    let report = engine.consolidate().unwrap();
    assert_eq!(report.snapshots_created, 0);
    assert_eq!(engine.len(), 10);
}

#[test]
fn test_eleven_memories_yield_one_snapshot() {
    let (engine, _dir) = setup_engine();
    seed_project(&engine, "demo");

    let report = engine.consolidate().unwrap();
    assert_eq!(report.purged, 0);
    assert_eq!(report.snapshots_created, 1);

    // Sources survive; the snapshot is additive
    assert_eq!(engine.len(), 12);

    let listed = engine.list().unwrap();
    let snapshot = listed
        .iter()
        .find(|m| m.metadata.tags.contains(&"snapshot".to_string()))
        .expect("snapshot memory exists");
    assert!(snapshot.metadata.tags.contains(&"milestone".to_string()));
    assert_eq!(snapshot.metadata.summary_of_count, Some(11));
    assert!(snapshot.content.starts_with("Project snapshot: demo"));
    assert!(snapshot.content.contains("Highlights:"));
    assert!(snapshot.content.contains("decided to keep the read model"));
}

#[test]
fn test_second_run_creates_no_second_snapshot() {
    let (engine, _dir) = setup_engine();
    seed_project(&engine, "demo");

    let first = engine.consolidate().unwrap();
    assert_eq!(first.snapshots_created, 1);

    let second = engine.consolidate().unwrap();
    assert_eq!(second.snapshots_created, 0);
    assert_eq!(second.projects_already_consolidated, 1);
    assert_eq!(engine.len(), 12);
}

#[test]
fn test_projects_consolidate_independently() {
    let (engine, _dir) = setup_engine();
    seed_project(&engine, "alpha");

    for note in [
        "beta rollout starts with internal accounts only for the first week",
        "the beta feedback form posts straight into the triage channel",
        "billing is disabled in beta builds until the contract is signed",
    ] {
        engine.memorize(note, &[], &ctx("beta")).unwrap();
    }

    let report = engine.consolidate().unwrap();
    assert_eq!(report.snapshots_created, 1, "only alpha crosses the threshold");

    let listed = engine.list().unwrap();
    let snapshot = listed
        .iter()
        .find(|m| m.metadata.tags.contains(&"snapshot".to_string()))
        .unwrap();
    assert_eq!(snapshot.metadata.project, "alpha");
}

#[test]
fn test_purge_then_group_in_one_run() {
    let (engine, _dir) = setup_engine();
    seed_project(&engine, "demo");
    engine.memorize("ok", &[], &ctx("demo")).unwrap();

    let report = engine.consolidate().unwrap();
    assert_eq!(report.purged, 1);
    assert_eq!(report.snapshots_created, 1);

    // 11 survivors + 1 snapshot
    assert_eq!(engine.len(), 12);
    let listed = engine.list().unwrap();
    let snapshot = listed
        .iter()
        .find(|m| m.metadata.tags.contains(&"snapshot".to_string()))
        .unwrap();
    // The tally records the project as it stood before the purge
    assert_eq!(snapshot.metadata.summary_of_count, Some(12), "purged stub still counted");
    assert!(!snapshot.content.contains("] ok"), "purged stub stays out of the document");
}
