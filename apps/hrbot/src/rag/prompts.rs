// Prompt builders for the query engine and the fallback policy.
// Fixed user-facing replies live in llm_client::prompts.

use crate::llm_client::prompts::{ASSISTANT_NAME, ESCALATION_MESSAGE};

/// Asks the model to answer strictly from `context`, escalating otherwise.
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "\nUsing ONLY the HR policy text below, answer the user's question clearly.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         QUESTION: {question}\n\
         \n\
         If the context does NOT contain the answer, reply with:\n\
         \"{ESCALATION_MESSAGE}\"\n"
    )
}

/// Asks the model for a short, polite refusal of an off-topic question.
pub fn build_off_topic_prompt(question: &str) -> String {
    format!(
        "\nYou are {ASSISTANT_NAME}, an HR-only assistant.\n\
         The user asked something outside HR:\n\
         \n\
         \"{question}\"\n\
         \n\
         Reply in 1–2 sentences:\n\
         - Politely refuse.\n\
         - Tell them you ONLY handle HR matters.\n\
         - Redirect them back to HR topics.\n\
         - Mention Louisa ONLY for HR-related issues.\n"
    )
}
