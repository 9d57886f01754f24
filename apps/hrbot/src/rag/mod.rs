//! Retrieval-augmented answering over the HR policy corpus.
//!
//! Flow: embed question → nearest chunks → distance filter →
//!       (context prompt → LLM) | fallback policy → conversation log.
//!
//! Two independent guards keep the model from guessing: the distance
//! threshold drops weak matches before any prompt is built, and the answer
//! prompt tells the model to reply with the escalation sentence when the
//! context does not cover the question.

pub mod engine;
pub mod fallback;
pub mod history;
pub mod ontology;
pub mod prompts;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::embedding::EmbedError;
use crate::vector_store::{ChunkMetadata, IndexError};
use history::ConversationRecord;

const UNKNOWN_SOURCE: &str = "Unknown";
const UNKNOWN_PAGE: &str = "N/A";

/// Failures with no safe substitute answer. LLM failures never show up here.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Vector index failed: {0}")]
    Index(#[from] IndexError),

    #[error("Embedder returned no vector for the question")]
    MissingQueryVector,
}

/// Where a piece of answer context came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub source: String,
    pub page: String,
}

impl SourceRef {
    pub fn from_metadata(metadata: &ChunkMetadata) -> Self {
        Self {
            source: metadata
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            page: metadata
                .page
                .map(|p| p.to_string())
                .unwrap_or_else(|| UNKNOWN_PAGE.to_string()),
        }
    }
}

/// How a question was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Relevant chunks were found and the model answered from them.
    Answered {
        answer: String,
        sources: Vec<SourceRef>,
    },
    /// Nothing relevant was found but the topic is HR: routed to a human.
    Escalated { answer: String },
    /// Nothing relevant was found and the topic is not HR.
    Refused { answer: String },
}

impl QueryOutcome {
    pub fn answer(&self) -> &str {
        match self {
            QueryOutcome::Answered { answer, .. }
            | QueryOutcome::Escalated { answer }
            | QueryOutcome::Refused { answer } => answer,
        }
    }

    pub fn sources(&self) -> &[SourceRef] {
        match self {
            QueryOutcome::Answered { sources, .. } => sources,
            QueryOutcome::Escalated { .. } | QueryOutcome::Refused { .. } => &[],
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, QueryOutcome::Answered { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueryOutcome::Answered { .. } => "answered",
            QueryOutcome::Escalated { .. } => "escalated",
            QueryOutcome::Refused { .. } => "refused",
        }
    }
}

/// Result of one query: the outcome plus the conversation log as of this query.
///
/// Serialized flat as `{outcome, answer, sources, history}` for every outcome;
/// fallback answers carry an empty `sources` list.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub outcome: QueryOutcome,
    pub history: Vec<ConversationRecord>,
}

impl Serialize for QueryResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryResponse", 4)?;
        state.serialize_field("outcome", self.outcome.label())?;
        state.serialize_field("answer", self.outcome.answer())?;
        state.serialize_field("sources", self.outcome.sources())?;
        state.serialize_field("history", &self.history)?;
        state.end()
    }
}
