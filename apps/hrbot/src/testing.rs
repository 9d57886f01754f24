//! In-process fakes for the capability traits, shared by unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::embedding::{EmbedError, Embedder};
use crate::ingest::loader::{DocumentLoader, LoadError, PageText};
use crate::llm_client::{LanguageModel, LlmError};
use crate::vector_store::{IndexError, IndexRecord, QueryMatch, VectorIndex};

/// Bag-of-topics embedder: one dimension per vocabulary term, 1.0 when the
/// lower-cased text mentions it. Texts sharing a topic land at distance 0,
/// texts with disjoint topics at distance ≥ 2.
pub struct TopicEmbedder {
    vocabulary: Vec<&'static str>,
    calls: AtomicUsize,
}

impl TopicEmbedder {
    pub fn new() -> Self {
        Self {
            vocabulary: vec!["leave", "salary", "onboarding", "weather", "football"],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for TopicEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                self.vocabulary
                    .iter()
                    .map(|term| if lower.contains(term) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

/// Embedder whose every call fails.
pub struct BrokenEmbedder;

#[async_trait]
impl Embedder for BrokenEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Err(EmbedError::CountMismatch {
            expected: texts.len(),
            actual: 0,
        })
    }
}

/// Language model that records prompts and replies from a script.
pub struct ScriptedLlm {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

/// Vector index that ignores the query vector and returns canned matches.
pub struct CannedIndex {
    matches: Vec<QueryMatch>,
}

impl CannedIndex {
    pub fn new(matches: Vec<QueryMatch>) -> Self {
        Self { matches }
    }
}

#[async_trait]
impl VectorIndex for CannedIndex {
    async fn add(&self, _records: Vec<IndexRecord>) -> Result<(), IndexError> {
        Ok(())
    }

    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, IndexError> {
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.matches.len())
    }

    async fn replace_all(&self, _records: Vec<IndexRecord>) -> Result<(), IndexError> {
        Ok(())
    }
}

/// Loader keyed by file name; names without an entry fail to load.
pub struct FixtureLoader {
    pages: HashMap<String, Vec<PageText>>,
}

impl FixtureLoader {
    pub fn new(files: &[(&str, &[&str])]) -> Self {
        let pages = files
            .iter()
            .map(|(name, texts)| {
                let pages = texts
                    .iter()
                    .enumerate()
                    .map(|(i, text)| PageText {
                        page: i as u32,
                        text: text.to_string(),
                    })
                    .collect();
                (name.to_string(), pages)
            })
            .collect();
        Self { pages }
    }
}

impl DocumentLoader for FixtureLoader {
    fn load(&self, path: &Path) -> Result<Vec<PageText>, LoadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.pages
            .get(&name)
            .cloned()
            .ok_or_else(|| LoadError::Pdf(format!("no fixture for {name}")))
    }
}
