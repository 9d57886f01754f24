//! Vector Index: persistent store of (id, vector, text, metadata) rows.
//!
//! `JsonVectorStore` keeps the whole collection in memory and rewrites a single
//! JSON file on every change. The HR corpus is a handful of PDFs, so a flat
//! scan per query is fine.
//!
//! Distances are squared Euclidean (lower = more similar), matching the
//! default metric the relevance threshold was tuned against.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt vector store: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Duplicate chunk id: {0}")]
    DuplicateId(String),

    #[error("Chunk {0} has no text")]
    EmptyDocument(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unsupported store format version {0}")]
    UnsupportedVersion(u32),
}

/// Provenance attached to every chunk. Both fields are optional so rows
/// written by other tools still load; readers apply their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One stored row. Immutable once added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A ranked query hit. Results are ordered by ascending `distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Batch insert. The whole batch is rejected if any id is already present
    /// (or repeated within the batch), any text is empty, or any vector has
    /// the wrong dimension.
    async fn add(&self, records: Vec<IndexRecord>) -> Result<(), IndexError>;

    /// Up to `top_k` nearest rows, closest first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, IndexError>;

    async fn count(&self) -> Result<usize, IndexError>;

    /// Swaps the whole collection for `records` in one step. Validated like
    /// `add`; on any error the current rows stay in place.
    async fn replace_all(&self, records: Vec<IndexRecord>) -> Result<(), IndexError>;
}

#[derive(Serialize, Deserialize)]
struct StoredCollection {
    version: u32,
    rows: Vec<IndexRecord>,
}

pub struct JsonVectorStore {
    path: PathBuf,
    rows: RwLock<Vec<IndexRecord>>,
}

impl JsonVectorStore {
    /// Opens the collection at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let path = path.into();
        let rows = if tokio::fs::try_exists(&path).await? {
            let data = tokio::fs::read_to_string(&path).await?;
            let stored: StoredCollection = serde_json::from_str(&data)?;
            if stored.version != STORE_FORMAT_VERSION {
                return Err(IndexError::UnsupportedVersion(stored.version));
            }
            info!("Loaded {} chunks from {}", stored.rows.len(), path.display());
            stored.rows
        } else {
            info!("No vector store at {}, starting empty", path.display());
            Vec::new()
        };

        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file then renames it over the target.
    async fn persist(&self, rows: &[IndexRecord]) -> Result<(), IndexError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        #[derive(Serialize)]
        struct StoredRef<'a> {
            version: u32,
            rows: &'a [IndexRecord],
        }

        let data = serde_json::to_string(&StoredRef {
            version: STORE_FORMAT_VERSION,
            rows,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} chunks to {}", rows.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for JsonVectorStore {
    async fn add(&self, records: Vec<IndexRecord>) -> Result<(), IndexError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut rows = self.rows.write().await;
        validate_batch(&rows, &records)?;

        let previous_len = rows.len();
        rows.extend(records);
        if let Err(e) = self.persist(&rows).await {
            rows.truncate(previous_len);
            return Err(e);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, IndexError> {
        let rows = self.rows.read().await;
        if let Some(first) = rows.first() {
            if first.vector.len() != vector.len() {
                return Err(IndexError::DimensionMismatch {
                    expected: first.vector.len(),
                    actual: vector.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &IndexRecord)> = rows
            .iter()
            .map(|row| (squared_l2(vector, &row.vector), row))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, row)| QueryMatch {
                id: row.id.clone(),
                document: row.text.clone(),
                metadata: row.metadata.clone(),
                distance,
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.rows.read().await.len())
    }

    async fn replace_all(&self, records: Vec<IndexRecord>) -> Result<(), IndexError> {
        validate_batch(&[], &records)?;

        let mut rows = self.rows.write().await;
        self.persist(&records).await?;
        info!(
            "Vector store {} replaced: {} -> {} chunks",
            self.path.display(),
            rows.len(),
            records.len()
        );
        *rows = records;
        Ok(())
    }
}

fn validate_batch(existing: &[IndexRecord], batch: &[IndexRecord]) -> Result<(), IndexError> {
    let expected_dim = existing
        .first()
        .or_else(|| batch.first())
        .map(|r| r.vector.len())
        .unwrap_or_default();

    let mut seen: HashSet<&str> = existing.iter().map(|r| r.id.as_str()).collect();
    for record in batch {
        if !seen.insert(record.id.as_str()) {
            return Err(IndexError::DuplicateId(record.id.clone()));
        }
        if record.text.trim().is_empty() {
            return Err(IndexError::EmptyDocument(record.id.clone()));
        }
        if record.vector.len() != expected_dim {
            return Err(IndexError::DimensionMismatch {
                expected: expected_dim,
                actual: record.vector.len(),
            });
        }
    }
    Ok(())
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
