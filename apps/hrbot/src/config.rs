use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::rag::engine::RetrievalSettings;
use crate::rag::ontology::KeywordMatching;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub data_dir: PathBuf,
    pub vector_store_path: PathBuf,
    pub embedding_url: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub distance_threshold: f32,
    pub ontology_match: KeywordMatching,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            groq_api_key: lookup("GROQ_API_KEY").with_context(|| {
                "Required environment variable 'GROQ_API_KEY' is not set".to_string()
            })?,
            data_dir: lookup("DATA_DIR")
                .unwrap_or_else(|| "./data".to_string())
                .into(),
            vector_store_path: lookup("VECTOR_STORE_PATH")
                .unwrap_or_else(|| "./vector_store/hr_documents.json".to_string())
                .into(),
            embedding_url: lookup("EMBEDDING_URL")
                .unwrap_or_else(|| "http://localhost:8081/v1/embeddings".to_string()),
            embedding_model: lookup("EMBEDDING_MODEL")
                .unwrap_or_else(|| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
            chunk_size: parse_or(&lookup, "CHUNK_SIZE", 500)?,
            chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", 150)?,
            top_k: parse_or(&lookup, "TOP_K", 3)?,
            distance_threshold: parse_or(&lookup, "DISTANCE_THRESHOLD", 1.5)?,
            ontology_match: match lookup("ONTOLOGY_MATCH") {
                Some(raw) => raw
                    .parse::<KeywordMatching>()
                    .map_err(anyhow::Error::msg)
                    .context("ONTOLOGY_MATCH is invalid")?,
                None => KeywordMatching::default(),
            },
            port: parse_or(&lookup, "PORT", 5000)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than 0");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        if self.top_k == 0 {
            bail!("TOP_K must be at least 1");
        }
        if !(self.distance_threshold.is_finite() && self.distance_threshold > 0.0) {
            bail!("DISTANCE_THRESHOLD must be a positive number");
        }
        Ok(())
    }

    pub fn retrieval(&self) -> RetrievalSettings {
        RetrievalSettings {
            top_k: self.top_k,
            distance_threshold: self.distance_threshold,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
