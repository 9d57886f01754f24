//! Query Engine: answers one question from the indexed HR corpus.
//!
//! Steps:
//! 1. embed the question (same embedder as ingestion)
//! 2. fetch `top_k` nearest chunks
//! 3. keep chunks with distance < threshold; none left → FallbackPolicy
//! 4. join kept chunk texts (rank order, blank-line separated) into the context
//! 5. build the answer prompt and call the LLM; failure → fixed substitute
//! 6. append to the conversation log
//!
//! Only embedding/index failures surface as errors; everything after retrieval
//! resolves to an answer string.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::embedding::Embedder;
use crate::llm_client::prompts::LLM_UNAVAILABLE_MESSAGE;
use crate::llm_client::LanguageModel;
use crate::rag::fallback::FallbackPolicy;
use crate::rag::history::{ConversationLog, ConversationRecord};
use crate::rag::prompts::build_answer_prompt;
use crate::rag::{QueryOutcome, QueryResponse, RagError, SourceRef};
use crate::vector_store::{QueryMatch, VectorIndex};

const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    pub top_k: usize,
    /// Chunks at or beyond this distance are ignored.
    pub distance_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            distance_threshold: 1.5,
        }
    }
}

pub struct QueryEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LanguageModel>,
    fallback: FallbackPolicy,
    log: Arc<ConversationLog>,
    settings: RetrievalSettings,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LanguageModel>,
        fallback: FallbackPolicy,
        log: Arc<ConversationLog>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            fallback,
            log,
            settings,
        }
    }

    pub fn settings(&self) -> RetrievalSettings {
        self.settings
    }

    pub fn history(&self) -> Vec<ConversationRecord> {
        self.log.snapshot()
    }

    /// Answers with the configured `top_k`.
    pub async fn query(&self, question: &str) -> Result<QueryResponse, RagError> {
        self.query_with_top_k(question, self.settings.top_k).await
    }

    /// `top_k` below 1 is treated as 1.
    pub async fn query_with_top_k(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<QueryResponse, RagError> {
        let query_vector = self
            .embedder
            .encode(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(RagError::MissingQueryVector)?;

        let matches = self.index.query(&query_vector, top_k.max(1)).await?;
        let relevant = filter_relevant(matches, self.settings.distance_threshold);

        if relevant.is_empty() {
            debug!("No chunk under distance {}", self.settings.distance_threshold);
            return Ok(self.fallback.handle_no_match(question).await);
        }

        let context = relevant
            .iter()
            .map(|m| m.document.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let sources: Vec<SourceRef> = relevant
            .iter()
            .map(|m| SourceRef::from_metadata(&m.metadata))
            .collect();
        debug!(
            "Answering from {} chunks (closest distance {:.3})",
            relevant.len(),
            relevant[0].distance
        );

        let answer = match self.llm.invoke(&build_answer_prompt(&context, question)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("LLM answer failed, using fixed reply: {}", e);
                LLM_UNAVAILABLE_MESSAGE.to_string()
            }
        };

        let history = self.log.append(ConversationRecord {
            question: question.to_string(),
            answer: answer.clone(),
            sources: sources.clone(),
        });

        Ok(QueryResponse {
            outcome: QueryOutcome::Answered { answer, sources },
            history,
        })
    }
}

/// Keeps matches strictly under `threshold`, preserving rank order.
fn filter_relevant(matches: Vec<QueryMatch>, threshold: f32) -> Vec<QueryMatch> {
    matches
        .into_iter()
        .filter(|m| m.distance < threshold)
        .collect()
}
