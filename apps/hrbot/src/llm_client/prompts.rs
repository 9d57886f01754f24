// Shared user-facing strings and prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains the fixed replies that several services return verbatim.

/// Name the assistant introduces itself with.
pub const ASSISTANT_NAME: &str = "Orange-HR";

/// Human escalation reply. Returned verbatim for in-domain questions with no
/// retrieved content, and requested from the model when its context falls short.
pub const ESCALATION_MESSAGE: &str =
    "Please kindly visit Louisa at the HR office for proper assistance.";

/// Substitute answer when the model cannot be reached while answering from context.
pub const LLM_UNAVAILABLE_MESSAGE: &str = "HR system unavailable. Please try again.";

/// Substitute answer when the model cannot be reached while refusing an off-topic question.
pub const OFF_TOPIC_FALLBACK_MESSAGE: &str = "I can only assist with HR-related questions.";
