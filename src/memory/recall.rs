//! Ranked recall pipeline
//!
//! Read path over the vector store, decomposed into named stages so each is
//! independently testable:
//!
//!   query -> decrypt -> threshold filter -> sort -> interlink expansion
//!         -> relation labeling -> lexical rerank
//!
//! Stages after the initial query are pure over `Vec<RankedMemory>`; only
//! the queries themselves touch the store, and only store failures
//! propagate.

use anyhow::Result;
use ordered_float::OrderedFloat;

use crate::constants::{
    INTERLINK_DISTANCE, INTERLINK_RESULTS, RERANK_BONUS, RERANK_MIN_RESULTS, RERANK_WINDOW,
};
use crate::crypto::CryptoGateway;
use crate::memory::tagging::labels;
use crate::memory::types::{relation, RankedMemory};
use crate::vector_store::{ScoredRecord, VectorStore};

/// Tags that trigger interlink expansion, in priority order. The first one
/// present on the top result wins.
const INTERLINK_PRIORITY: &[&str] = &[
    labels::DECISION,
    labels::ARCHITECTURE,
    labels::SYSTEM_ERROR,
    labels::USER_PROFILE,
];

/// Run the full recall pipeline.
///
/// `max_results` bounds the primary query; `threshold` is the inclusive
/// distance cutoff. Interlink entries bypass the cutoff by design and carry
/// the fixed synthetic distance.
pub fn recall(
    store: &dyn VectorStore,
    gateway: &CryptoGateway,
    query: &str,
    max_results: usize,
    threshold: f32,
) -> Result<Vec<RankedMemory>> {
    let hits = store.query(query, max_results)?;
    let mut results = decrypt_hits(gateway, hits);

    filter_by_threshold(&mut results, threshold);
    sort_by_distance(&mut results);

    if max_results > 1 {
        expand_interlinks(store, gateway, &mut results)?;
    }

    label_relations(&mut results);
    lexical_rerank(&mut results, query);

    Ok(results)
}

/// Turn raw store hits into working results with decrypted content. The
/// relation label is filled in later; entries start unlabeled.
fn decrypt_hits(gateway: &CryptoGateway, hits: Vec<ScoredRecord>) -> Vec<RankedMemory> {
    hits.into_iter()
        .map(|hit| RankedMemory {
            id: hit.record.id,
            content: gateway.decrypt(&hit.record.document),
            metadata: hit.record.metadata,
            distance: hit.distance,
            relation: String::new(),
        })
        .collect()
}

/// Drop entries farther than `threshold` (inclusive pass at equality).
fn filter_by_threshold(results: &mut Vec<RankedMemory>, threshold: f32) {
    results.retain(|r| r.distance <= threshold);
}

/// Ascending by distance: closest first is index 0.
fn sort_by_distance(results: &mut [RankedMemory]) {
    results.sort_by_key(|r| OrderedFloat(r.distance));
}

/// Interlink expansion: when the top result carries a priority tag, run a
/// secondary query using that tag's label text and append any entries not
/// already present, at the fixed synthetic distance and with a tag-derived
/// relation label.
fn expand_interlinks(
    store: &dyn VectorStore,
    gateway: &CryptoGateway,
    results: &mut Vec<RankedMemory>,
) -> Result<()> {
    let Some(top) = results.first() else {
        return Ok(());
    };

    let Some(tag) = INTERLINK_PRIORITY
        .iter()
        .find(|t| top.metadata.tags.iter().any(|have| have == *t))
        .copied()
    else {
        return Ok(());
    };

    let linked = store.query(tag, INTERLINK_RESULTS)?;
    for hit in linked {
        if results.iter().any(|r| r.id == hit.record.id) {
            continue;
        }
        results.push(RankedMemory {
            id: hit.record.id,
            content: gateway.decrypt(&hit.record.document),
            metadata: hit.record.metadata,
            distance: INTERLINK_DISTANCE,
            relation: relation::linked_via(tag),
        });
    }

    Ok(())
}

/// Give every unlabeled entry its relation: "primary match" at index 0,
/// "semantic match" otherwise. Interlink entries already carry their label
/// and are left untouched.
fn label_relations(results: &mut [RankedMemory]) {
    for (index, result) in results.iter_mut().enumerate() {
        if !result.relation.is_empty() {
            continue;
        }
        result.relation = if index == 0 {
            relation::PRIMARY.to_string()
        } else {
            relation::SEMANTIC.to_string()
        };
    }
}

/// Lexical rerank: entries within the window of the top distance get a flat
/// bonus when the literal query occurs (case-insensitively) in their
/// content, then the list is re-sorted. Runs only past the minimum result
/// count; evaluated uniformly over all entries, interlink ones included;
/// their synthetic distance keeps them out of any realistic window.
fn lexical_rerank(results: &mut [RankedMemory], query: &str) {
    if results.len() < RERANK_MIN_RESULTS {
        return;
    }

    let top_distance = results[0].distance;
    let needle = query.to_lowercase();

    for result in results.iter_mut() {
        if result.distance - top_distance < RERANK_WINDOW
            && result.content.to_lowercase().contains(&needle)
        {
            result.distance -= RERANK_BONUS;
        }
    }

    sort_by_distance(results);
}
