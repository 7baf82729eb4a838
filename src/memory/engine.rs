//! Memory engine: orchestration between raw text and the collaborators
//!
//! Owns the vector store and the encryption gateway (both injected at
//! construction, config included, no ambient globals) and wires the core
//! decision logic together: classify, probe, encrypt, store on the write
//! path; query, decrypt, rank on the read path; purge and synthesize in the
//! batch path.
//!
//! Every operation is synchronous and blocking; callers that need async
//! wrap it in their own blocking task. Failures of the store or the gateway
//! propagate; heuristic steps never raise.

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::constants::GET_ALL_LIMIT;
use crate::crypto::CryptoGateway;
use crate::memory::consolidation::{
    build_snapshot_document, group_by_project, is_purge_candidate, needs_snapshot,
};
use crate::memory::tagging::{classify, infer_tech_stack, labels, merge_tags, snippet_preview};
use crate::memory::types::{
    ConsolidationReport, Memory, MemoryId, MemoryMetadata, MemorizeOutcome, RankedMemory,
};
use crate::memory::{probes, recall as recall_pipeline, risks as risk_scan};
use crate::vector_store::{VectorRecord, VectorStore};

/// Provenance of the invocation that creates a memory.
#[derive(Debug, Clone, Default)]
pub struct WriteContext {
    pub project: String,
    pub path: String,
}

/// Marker files probed in the invocation path for the tech-stack guess.
const STACK_MARKERS: &[(&str, &str)] = &[
    ("Cargo.toml", "rust"),
    ("package.json", "node"),
    ("requirements.txt", "python"),
    ("pyproject.toml", "python"),
    ("go.mod", "go"),
    ("docker-compose.yml", "docker"),
];

/// Tech-stack guess for a new memory. Marker files in the invocation path
/// win; content keywords are the fallback when the path has none or does
/// not exist.
fn detect_tech_stack(content: &str, path: &str) -> Option<String> {
    if !path.is_empty() {
        let dir = std::path::Path::new(path);
        let mut found: Vec<&str> = Vec::new();
        for (marker, tech) in STACK_MARKERS {
            if dir.join(marker).exists() && !found.contains(tech) {
                found.push(tech);
            }
        }
        if !found.is_empty() {
            return Some(found.join(", "));
        }
    }
    infer_tech_stack(content)
}

/// The memory engine. One instance per invocation; the store's own locking
/// is the only cross-process guard (the write-time probes carry a
/// check-then-act race between independent processes, accepted by design).
pub struct MemoryEngine {
    config: EngineConfig,
    store: Box<dyn VectorStore>,
    gateway: CryptoGateway,
}

impl MemoryEngine {
    /// Assemble an engine from injected collaborators.
    pub fn new(config: EngineConfig, store: Box<dyn VectorStore>, gateway: CryptoGateway) -> Self {
        Self { config, store, gateway }
    }

    /// Open an engine over the local reference backend at the configured
    /// storage path.
    pub fn open(config: EngineConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.storage_path).with_context(|| {
            format!("creating storage dir {}", config.storage_path.display())
        })?;
        let gateway = CryptoGateway::open(&config.storage_path)?;
        let store = crate::vector_store::LocalVectorStore::open(
            &config.storage_path.join("vectors"),
        )?;
        Ok(Self::new(config, Box::new(store), gateway))
    }

    /// Number of stored memories.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Write path: classify, guard against duplicates, flag conflicts,
    /// encrypt, store.
    ///
    /// When the duplicate guard fires, the write is suppressed and the
    /// existing id comes back with `created: false`. A conflict flag never
    /// blocks the write; it is annotated on the new memory.
    #[tracing::instrument(skip(self, content, supplied_tags), fields(project = %ctx.project))]
    pub fn memorize(
        &self,
        content: &str,
        supplied_tags: &[String],
        ctx: &WriteContext,
    ) -> Result<MemorizeOutcome> {
        self.memorize_inner(content, supplied_tags, ctx, None)
    }

    fn memorize_inner(
        &self,
        content: &str,
        supplied_tags: &[String],
        ctx: &WriteContext,
        summary_of_count: Option<usize>,
    ) -> Result<MemorizeOutcome> {
        let tags = merge_tags(classify(content), supplied_tags);

        if let Some(existing) =
            probes::check_duplicate(self.store.as_ref(), content, self.config.duplicate_distance)?
        {
            return Ok(MemorizeOutcome {
                id: existing,
                created: false,
                tags: Vec::new(),
                conflict_with: None,
            });
        }

        let conflict_with = probes::check_conflict(
            self.store.as_ref(),
            content,
            &tags,
            self.config.duplicate_distance,
            self.config.conflict_distance,
        )?;

        let mut metadata = MemoryMetadata::new(ctx.project.clone(), ctx.path.clone());
        metadata.tags = tags.clone();
        metadata.tech_stack = detect_tech_stack(content, &ctx.path);
        metadata.snippet_preview = snippet_preview(content);
        metadata.has_code = metadata.snippet_preview.is_some();
        metadata.potential_conflict_with = conflict_with.clone();
        metadata.summary_of_count = summary_of_count;

        let id = MemoryId::new();
        let ciphertext = self.gateway.encrypt(content)?;

        self.store.add(vec![VectorRecord {
            id: id.clone(),
            document: ciphertext,
            index_text: content.to_string(),
            metadata,
        }])?;

        tracing::info!(id = %id, tags = ?tags, "memory stored");
        Ok(MemorizeOutcome { id, created: true, tags, conflict_with })
    }

    /// Read path: ranked recall through the staged pipeline.
    #[tracing::instrument(skip(self, query))]
    pub fn recall(
        &self,
        query: &str,
        max_results: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<RankedMemory>> {
        let threshold = threshold.unwrap_or(self.config.recall_distance);
        recall_pipeline::recall(self.store.as_ref(), &self.gateway, query, max_results, threshold)
    }

    /// Delete one memory by id. A nonexistent id is a store-level no-op;
    /// the engine does not distinguish "deleted" from "was never present".
    #[tracing::instrument(skip(self))]
    pub fn forget(&self, id: &MemoryId) -> Result<()> {
        self.store.delete(std::slice::from_ref(id))?;
        tracing::info!(id = %id, "memory forgotten");
        Ok(())
    }

    /// All memories, decrypted, up to the engine-wide limit.
    pub fn list(&self) -> Result<Vec<Memory>> {
        let records = self.store.get_all(GET_ALL_LIMIT)?;
        Ok(records
            .into_iter()
            .map(|r| Memory {
                content: self.gateway.decrypt(&r.document),
                id: r.id,
                metadata: r.metadata,
            })
            .collect())
    }

    /// Risk report for one project's memories, in storage order.
    pub fn risks(&self, project: &str) -> Result<Vec<String>> {
        let mut memories = self.list()?;
        memories.retain(|m| m.metadata.project == project);
        memories.sort_by(|a, b| a.metadata.timestamp.cmp(&b.metadata.timestamp));
        Ok(risk_scan::risks(&memories))
    }

    /// Batch path: purge stubs, then synthesize per-project snapshots
    /// through the normal write path. Source memories survive synthesis;
    /// an existing snapshot suppresses a project for good.
    ///
    /// The snapshot's source tally reflects the project as it stood before
    /// the purge; the synthesis gate and the document itself use only the
    /// survivors.
    #[tracing::instrument(skip(self))]
    pub fn consolidate(&self) -> Result<ConsolidationReport> {
        let mut report = ConsolidationReport::default();
        let memories = self.list()?;

        let mut pre_purge_sizes: BTreeMap<String, usize> = BTreeMap::new();
        for memory in &memories {
            *pre_purge_sizes.entry(memory.metadata.project.clone()).or_default() += 1;
        }

        // Purge phase
        let purge_ids: Vec<MemoryId> = memories
            .iter()
            .filter(|m| is_purge_candidate(m))
            .map(|m| m.id.clone())
            .collect();
        if !purge_ids.is_empty() {
            self.store.delete(&purge_ids)?;
            report.purged = purge_ids.len();
        }

        // Synthesis phase over the survivors
        let survivors: Vec<Memory> = memories
            .into_iter()
            .filter(|m| !purge_ids.contains(&m.id))
            .collect();

        for (project, group) in group_by_project(survivors) {
            if !needs_snapshot(&group) {
                // Distinguish "too small" from "already snapshotted" for the report
                if group.len() > crate::constants::SNAPSHOT_MIN_GROUP {
                    report.projects_already_consolidated += 1;
                }
                continue;
            }

            let document = build_snapshot_document(&project, &group);
            let path = group
                .first()
                .map(|m| m.metadata.path.clone())
                .unwrap_or_default();
            let source_count = pre_purge_sizes.get(&project).copied().unwrap_or(group.len());
            let outcome = self.memorize_inner(
                &document,
                &[labels::SNAPSHOT.to_string(), labels::MILESTONE.to_string()],
                &WriteContext { project: project.clone(), path },
                Some(source_count),
            )?;

            if outcome.created {
                report.snapshots_created += 1;
                tracing::info!(
                    project = %project,
                    snapshot = %outcome.id,
                    sources = group.len(),
                    "snapshot synthesized"
                );
            }
        }

        tracing::info!(
            purged = report.purged,
            snapshots = report.snapshots_created,
            "consolidation finished"
        );
        Ok(report)
    }
}
