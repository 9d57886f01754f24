//! Assistant: the message-level entry point: intent pre-filter, then the query engine.

use chrono::{Local, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::intent::{Intent, IntentClassifier};
use crate::rag::engine::QueryEngine;
use crate::rag::{RagError, SourceRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub intent: &'static str,
    pub sources: Vec<SourceRef>,
    /// True when retrieval found nothing and the answer is an escalation or refusal.
    pub fallback: bool,
}

pub struct Assistant {
    classifier: IntentClassifier,
    engine: QueryEngine,
}

impl Assistant {
    pub fn new(classifier: IntentClassifier, engine: QueryEngine) -> Self {
        Self { classifier, engine }
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Replies using the server's local hour for greetings.
    pub async fn reply(&self, message: &str) -> Result<ChatReply, RagError> {
        self.reply_at(message, Local::now().hour()).await
    }

    pub async fn reply_at(&self, message: &str, hour: u32) -> Result<ChatReply, RagError> {
        let intent = self.classifier.classify(message);
        debug!("Classified message as {}", intent.label());

        if let Some(answer) = intent.canned_reply(hour) {
            return Ok(ChatReply {
                answer,
                intent: intent.label(),
                sources: Vec::new(),
                fallback: false,
            });
        }

        let response = self.engine.query(message).await?;
        Ok(ChatReply {
            answer: response.outcome.answer().to_string(),
            intent: Intent::Question.label(),
            sources: response.outcome.sources().to_vec(),
            fallback: response.outcome.is_fallback(),
        })
    }
}
