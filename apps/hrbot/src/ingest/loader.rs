use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("PDF extractor panicked")]
    Panicked,

    #[error("Loader task failed: {0}")]
    Task(String),
}

/// Text of one page, with its zero-based index within the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Reads a source document into per-page text.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<PageText>, LoadError>;
}

/// Per-page text extraction backed by `pdf-extract`.
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<PageText>, LoadError> {
        // pdf-extract panics on some malformed inputs; one bad file must not take down ingestion.
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path))
            .map_err(|_| LoadError::Panicked)?
            .map_err(|e| LoadError::Pdf(e.to_string()))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page: i as u32,
                text,
            })
            .collect())
    }
}

/// Recursively finds `*.pdf` files (extension matched case-insensitively),
/// sorted for a stable ingestion order. An unreadable or missing directory
/// yields nothing.
pub fn discover_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    files
}
