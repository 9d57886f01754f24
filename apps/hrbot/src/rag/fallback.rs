//! Fallback Policy: what to say when retrieval found nothing relevant.
//!
//! HR topic (ontology hit) → fixed escalation sentence, never a model guess.
//! Anything else → model-written polite refusal, or a fixed refusal if the
//! model is unreachable. Both branches are logged with empty sources.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm_client::prompts::{ESCALATION_MESSAGE, OFF_TOPIC_FALLBACK_MESSAGE};
use crate::llm_client::LanguageModel;
use crate::rag::history::{ConversationLog, ConversationRecord};
use crate::rag::ontology::Ontology;
use crate::rag::prompts::build_off_topic_prompt;
use crate::rag::{QueryOutcome, QueryResponse};

pub struct FallbackPolicy {
    llm: Arc<dyn LanguageModel>,
    ontology: Ontology,
    log: Arc<ConversationLog>,
}

impl FallbackPolicy {
    pub fn new(llm: Arc<dyn LanguageModel>, ontology: Ontology, log: Arc<ConversationLog>) -> Self {
        Self { llm, ontology, log }
    }

    pub async fn handle_no_match(&self, question: &str) -> QueryResponse {
        let outcome = if self.ontology.is_in_domain(question) {
            debug!("No match, but question is HR-related: escalating");
            QueryOutcome::Escalated {
                answer: ESCALATION_MESSAGE.to_string(),
            }
        } else {
            debug!("No match and no HR keyword: refusing");
            let answer = match self.llm.invoke(&build_off_topic_prompt(question)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("LLM refusal failed, using fixed reply: {}", e);
                    OFF_TOPIC_FALLBACK_MESSAGE.to_string()
                }
            };
            QueryOutcome::Refused { answer }
        };

        let history = self.log.append(ConversationRecord {
            question: question.to_string(),
            answer: outcome.answer().to_string(),
            sources: Vec::new(),
        });

        QueryResponse { outcome, history }
    }
}
