//! Ingestion Stage: PDFs on disk → chunks → embeddings → vector index.
//!
//! Flow: discover_documents → loader (per page) → TextSplitter → one batch
//!       embed → one batch insert.
//!
//! Runs once at startup when the index is empty (`ensure_ingested`). An index
//! that already has rows is trusted as complete even if the PDFs changed since;
//! `reingest` is the explicit way to pick up new documents, and only swaps the
//! index once the replacement rows are fully embedded.

pub mod loader;
pub mod splitter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::embedding::{EmbedError, Embedder};
use crate::vector_store::{ChunkMetadata, IndexError, IndexRecord, VectorIndex};
use loader::{discover_documents, DocumentLoader, LoadError, PageText};
use splitter::TextSplitter;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Vector index failed: {0}")]
    Index(#[from] IndexError),

    #[error("Embedder returned {actual} vectors for {expected} chunks")]
    VectorCount { expected: usize, actual: usize },
}

/// A bounded span of page text with its provenance. Becomes an index row once embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: Option<u32>,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// True when the index already had rows and nothing was read.
    pub skipped: bool,
    pub files_found: usize,
    pub files_loaded: usize,
    pub files_failed: usize,
    pub chunks: usize,
}

pub struct IngestionStage {
    data_dir: PathBuf,
    splitter: TextSplitter,
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    /// Serialises runs so a re-ingest cannot interleave with another.
    run_lock: Mutex<()>,
}

impl IngestionStage {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        splitter: TextSplitter,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            splitter,
            loader,
            embedder,
            index,
            run_lock: Mutex::new(()),
        }
    }

    /// Ingests only if the index is empty.
    pub async fn ensure_ingested(&self) -> Result<IngestReport, IngestError> {
        let _guard = self.run_lock.lock().await;

        let count = self.index.count().await?;
        if count > 0 {
            info!("Vector DB ready with {} chunks.", count);
            return Ok(IngestReport {
                skipped: true,
                chunks: count,
                ..IngestReport::default()
            });
        }

        self.run().await
    }

    /// Re-reads the data directory and swaps the new chunks in for the old
    /// ones. The current index keeps serving until the new rows are embedded;
    /// a failed run, or one that yields no chunks, leaves it untouched.
    pub async fn reingest(&self) -> Result<IngestReport, IngestError> {
        let _guard = self.run_lock.lock().await;
        info!("Re-ingesting {}", self.data_dir.display());

        let (report, records) = self.build_records().await?;
        if records.is_empty() {
            warn!("Re-ingest produced no chunks; keeping the current index.");
            return Ok(report);
        }

        self.index.replace_all(records).await?;
        info!(
            "Re-ingest completed: {} chunks from {} of {} files.",
            report.chunks, report.files_loaded, report.files_found
        );
        Ok(report)
    }

    async fn run(&self) -> Result<IngestReport, IngestError> {
        let (report, records) = self.build_records().await?;
        if records.is_empty() {
            return Ok(report);
        }

        self.index.add(records).await?;
        info!(
            "Ingestion completed: {} chunks from {} of {} files.",
            report.chunks, report.files_loaded, report.files_found
        );
        Ok(report)
    }

    /// Discovery, loading, splitting and embedding. Touches nothing in the index.
    async fn build_records(&self) -> Result<(IngestReport, Vec<IndexRecord>), IngestError> {
        info!("Scanning PDFs in {}...", self.data_dir.display());
        let files = discover_documents(&self.data_dir);

        let mut report = IngestReport {
            files_found: files.len(),
            ..IngestReport::default()
        };

        if files.is_empty() {
            warn!("No PDFs found.");
            return Ok((report, Vec::new()));
        }

        let mut chunks = Vec::new();
        for path in &files {
            match self.load_off_thread(path).await {
                Ok(pages) => {
                    let source = file_name(path);
                    let before = chunks.len();
                    for page in pages {
                        chunks.extend(self.splitter.split(&page.text).into_iter().map(|text| {
                            DocumentChunk {
                                id: Uuid::new_v4().to_string(),
                                text,
                                source: source.clone(),
                                page: Some(page.page),
                            }
                        }));
                    }
                    info!("Loaded {} ({} chunks)", source, chunks.len() - before);
                    report.files_loaded += 1;
                }
                Err(e) => {
                    error!("Failed to load {}: {}", path.display(), e);
                    report.files_failed += 1;
                }
            }
        }

        if chunks.is_empty() {
            warn!("No text extracted from {} PDFs.", files.len());
            return Ok((report, Vec::new()));
        }

        info!("Embedding {} chunks...", chunks.len());
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.encode(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(IngestError::VectorCount {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexRecord {
                id: chunk.id,
                vector,
                text: chunk.text,
                metadata: ChunkMetadata {
                    source: Some(chunk.source),
                    page: chunk.page,
                },
            })
            .collect();

        report.chunks = records.len();
        Ok((report, records))
    }

    /// PDF parsing is CPU-bound; run it on the blocking pool.
    async fn load_off_thread(&self, path: &Path) -> Result<Vec<PageText>, LoadError> {
        let loader = self.loader.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || loader.load(&path))
            .await
            .map_err(|e| LoadError::Task(e.to_string()))?
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
