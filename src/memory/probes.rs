//! Write-time similarity probes: duplicate guard and conflict detector
//!
//! Both are single-nearest-neighbor probes against the vector store with
//! fixed thresholds, deliberately narrower than the ranked recall path.
//! They only annotate or suppress; they never raise on heuristic grounds;
//! only a store failure propagates.
//!
//! Known race: two near-simultaneous writes of near-identical content can
//! both pass the probe before either is persisted, yielding two entries.
//! The engine accepts this; there is no cross-process write lock.

use anyhow::Result;

use crate::constants::NEAR_IDENTICAL_DISTANCE;
use crate::memory::tagging::labels;
use crate::memory::types::MemoryId;
use crate::vector_store::VectorStore;

/// Tags whose content is routed through the conflict detector: statements
/// that can be contradicted rather than merely repeated.
const CONFLICT_TAGS: &[&str] = &[labels::DECISION, labels::SECRET_CONFIG];

/// Check whether `text` is already known.
///
/// Returns the nearest entry's id when its distance is below the identity
/// threshold, in which case the caller suppresses the write and surfaces
/// that id as "already known".
pub fn check_duplicate(
    store: &dyn VectorStore,
    text: &str,
    identity_threshold: f32,
) -> Result<Option<MemoryId>> {
    let hits = store.query(text, 1)?;
    let Some(nearest) = hits.first() else {
        return Ok(None);
    };

    if nearest.distance < identity_threshold {
        tracing::debug!(
            existing = %nearest.record.id,
            distance = nearest.distance,
            "duplicate guard suppressed write"
        );
        return Ok(Some(nearest.record.id.clone()));
    }

    Ok(None)
}

/// Check whether `text` contradicts a prior entry.
///
/// Applies only to decision/config-tagged content. Flags the nearest prior
/// entry when its distance falls strictly between the identity threshold and
/// the relaxed ceiling: similar topic, different statement. Distances at or
/// below the near-identical floor are never flagged; that zone belongs to
/// the duplicate guard. Flagging never blocks the write.
pub fn check_conflict(
    store: &dyn VectorStore,
    text: &str,
    tags: &[String],
    identity_threshold: f32,
    conflict_threshold: f32,
) -> Result<Option<MemoryId>> {
    if !tags.iter().any(|t| CONFLICT_TAGS.contains(&t.as_str())) {
        return Ok(None);
    }

    let hits = store.query(text, 1)?;
    let Some(nearest) = hits.first() else {
        return Ok(None);
    };

    if nearest.distance <= NEAR_IDENTICAL_DISTANCE {
        return Ok(None);
    }

    if nearest.distance > identity_threshold && nearest.distance < conflict_threshold {
        tracing::info!(
            prior = %nearest.record.id,
            distance = nearest.distance,
            "flagging potential conflict with prior entry"
        );
        return Ok(Some(nearest.record.id.clone()));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONFLICT_DISTANCE, DUPLICATE_DISTANCE};
    use crate::memory::types::MemoryMetadata;
    use crate::vector_store::{ScoredRecord, StoredRecord, VectorRecord};

    /// Store stub reporting a scripted distance for its single record.
    struct FixedDistanceStore {
        id: MemoryId,
        distance: f32,
    }

    impl VectorStore for FixedDistanceStore {
        fn add(&self, _records: Vec<VectorRecord>) -> Result<()> {
            Ok(())
        }

        fn query(&self, _text: &str, max_results: usize) -> Result<Vec<ScoredRecord>> {
            if max_results == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![ScoredRecord {
                record: StoredRecord {
                    id: self.id.clone(),
                    document: "prior entry".to_string(),
                    metadata: MemoryMetadata::new("p", "/"),
                },
                distance: self.distance,
            }])
        }

        fn get_all(&self, _limit: usize) -> Result<Vec<StoredRecord>> {
            Ok(Vec::new())
        }

        fn delete(&self, _ids: &[MemoryId]) -> Result<()> {
            Ok(())
        }

        fn len(&self) -> usize {
            1
        }
    }

    fn store_at(distance: f32) -> (FixedDistanceStore, MemoryId) {
        let id = MemoryId::new();
        (FixedDistanceStore { id: id.clone(), distance }, id)
    }

    fn decision_tags() -> Vec<String> {
        vec![labels::DECISION.to_string()]
    }

    #[test]
    fn test_duplicate_below_threshold() {
        let (store, id) = store_at(0.05);
        let hit = check_duplicate(&store, "text", DUPLICATE_DISTANCE).unwrap();
        assert_eq!(hit, Some(id));
    }

    #[test]
    fn test_duplicate_at_threshold_passes() {
        let (store, _) = store_at(DUPLICATE_DISTANCE);
        assert!(check_duplicate(&store, "text", DUPLICATE_DISTANCE).unwrap().is_none());
    }

    #[test]
    fn test_conflict_inside_window() {
        let (store, id) = store_at(0.5);
        let hit = check_conflict(
            &store,
            "text",
            &decision_tags(),
            DUPLICATE_DISTANCE,
            CONFLICT_DISTANCE,
        )
        .unwrap();
        assert_eq!(hit, Some(id));
    }

    #[test]
    fn test_conflict_requires_decision_or_config_tag() {
        let (store, _) = store_at(0.5);
        let hit = check_conflict(
            &store,
            "text",
            &["architecture".to_string()],
            DUPLICATE_DISTANCE,
            CONFLICT_DISTANCE,
        )
        .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_near_identical_is_not_a_conflict() {
        let (store, _) = store_at(0.1);
        let hit = check_conflict(
            &store,
            "text",
            &decision_tags(),
            DUPLICATE_DISTANCE,
            CONFLICT_DISTANCE,
        )
        .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_window_bounds_are_strict() {
        for boundary in [DUPLICATE_DISTANCE, CONFLICT_DISTANCE] {
            let (store, _) = store_at(boundary);
            let hit = check_conflict(
                &store,
                "text",
                &decision_tags(),
                DUPLICATE_DISTANCE,
                CONFLICT_DISTANCE,
            )
            .unwrap();
            assert!(hit.is_none(), "distance {boundary} must not be flagged");
        }
    }

    #[test]
    fn test_far_entries_are_unrelated() {
        let (store, _) = store_at(0.95);
        let hit = check_conflict(
            &store,
            "text",
            &decision_tags(),
            DUPLICATE_DISTANCE,
            CONFLICT_DISTANCE,
        )
        .unwrap();
        assert!(hit.is_none());
    }
}
