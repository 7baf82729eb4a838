//! Vector store collaborator: trait plus the local reference backend
//!
//! The engine talks to similarity search through the `VectorStore` trait and
//! never assumes backend ordering; ranking is re-done in the recall
//! pipeline. `LocalVectorStore` is a brute-force reference implementation:
//! hashed-trigram embeddings held fully in RAM, records persisted in RocksDB
//! via bincode. It is deliberately not an ANN index.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use rocksdb::{IteratorMode, Options, DB};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::embedding::{cosine_distance, embed};
use crate::memory::types::{MemoryId, MemoryMetadata};

/// One record handed to the backend at write time.
///
/// `document` is the stored payload (ciphertext at rest); `index_text` is
/// what the backend embeds. The engine passes the plaintext as `index_text`,
/// mirroring the precomputed-embeddings path of production vector databases:
/// the stored text stays private, the index is built from meaning.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: MemoryId,
    pub document: String,
    pub index_text: String,
    pub metadata: MemoryMetadata,
}

/// A record as returned by reads: no index text, that is gone after add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: MemoryId,
    pub document: String,
    pub metadata: MemoryMetadata,
}

/// A stored record with its distance to a query.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: StoredRecord,
    pub distance: f32,
}

/// Nearest-neighbor search and persistence over (id, document, metadata)
/// triples. Distances are cosine: lower = more similar, 0 = identical.
pub trait VectorStore: Send + Sync {
    /// Add a batch of records. Ids are never reused; re-adding an existing
    /// id replaces it.
    fn add(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Up to `max_results` nearest neighbors of `text`, closest first.
    fn query(&self, text: &str, max_results: usize) -> Result<Vec<ScoredRecord>>;

    /// All records up to `limit`, in unspecified order.
    fn get_all(&self, limit: usize) -> Result<Vec<StoredRecord>>;

    /// Delete records by id. Unknown ids are a no-op: the store does not
    /// distinguish "deleted" from "was never present".
    fn delete(&self, ids: &[MemoryId]) -> Result<()>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// On-disk record layout. The embedding is persisted so reopening never
/// needs the original index text.
#[derive(Serialize, Deserialize)]
struct PersistedRecord {
    record: StoredRecord,
    embedding: Vec<f32>,
}

/// In-RAM table entry.
struct Entry {
    record: StoredRecord,
    embedding: Vec<f32>,
}

/// Brute-force cosine store over RocksDB.
///
/// The whole embedding table lives in RAM; every query is a full scan. Fine
/// for per-user collections of tens of thousands of entries, which is what
/// a single agent accumulates.
pub struct LocalVectorStore {
    db: DB,
    entries: RwLock<HashMap<MemoryId, Entry>>,
}

impl LocalVectorStore {
    /// Open (or create) the store under `path` and load every record.
    pub fn open(path: &Path) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)
            .with_context(|| format!("opening vector store at {}", path.display()))?;

        let mut entries = HashMap::new();
        for item in db.iterator(IteratorMode::Start) {
            let (key, value) = match item {
                Ok(kv) => kv,
                Err(e) => {
                    tracing::warn!("vector store iterator error (continuing): {e}");
                    continue;
                }
            };
            match bincode::deserialize::<PersistedRecord>(&value) {
                Ok(persisted) => {
                    entries.insert(
                        persisted.record.id.clone(),
                        Entry {
                            record: persisted.record,
                            embedding: persisted.embedding,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&key),
                        "skipping undecodable vector store record: {e}"
                    );
                }
            }
        }

        tracing::info!(path = %path.display(), records = entries.len(), "vector store opened");
        Ok(Self {
            db,
            entries: RwLock::new(entries),
        })
    }
}

impl VectorStore for LocalVectorStore {
    fn add(&self, records: Vec<VectorRecord>) -> Result<()> {
        let mut entries = self.entries.write();
        for record in records {
            let embedding = embed(&record.index_text);
            let stored = StoredRecord {
                id: record.id.clone(),
                document: record.document,
                metadata: record.metadata,
            };
            let persisted = PersistedRecord {
                record: stored,
                embedding,
            };

            let bytes = bincode::serialize(&persisted).context("serializing record")?;
            self.db
                .put(record.id.to_string().as_bytes(), bytes)
                .context("writing record")?;

            entries.insert(
                persisted.record.id.clone(),
                Entry {
                    record: persisted.record,
                    embedding: persisted.embedding,
                },
            );
        }
        Ok(())
    }

    fn query(&self, text: &str, max_results: usize) -> Result<Vec<ScoredRecord>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embed(text);
        let entries = self.entries.read();

        let mut scored: Vec<ScoredRecord> = entries
            .values()
            .map(|entry| ScoredRecord {
                record: entry.record.clone(),
                distance: cosine_distance(&query_vec, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            ordered_float::OrderedFloat(a.distance).cmp(&ordered_float::OrderedFloat(b.distance))
        });
        scored.truncate(max_results);
        Ok(scored)
    }

    fn get_all(&self, limit: usize) -> Result<Vec<StoredRecord>> {
        let entries = self.entries.read();
        Ok(entries.values().take(limit).map(|e| e.record.clone()).collect())
    }

    fn delete(&self, ids: &[MemoryId]) -> Result<()> {
        let mut entries = self.entries.write();
        for id in ids {
            self.db
                .delete(id.to_string().as_bytes())
                .context("deleting record")?;
            entries.remove(id);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
