//! Intent pre-filter: cheap text checks that answer without retrieval or the LLM.
//!
//! Checked in order on the trimmed, lower-cased message; first match wins:
//! greeting prefix → closing word anywhere → too short → real question.

use regex::Regex;

use crate::llm_client::prompts::ASSISTANT_NAME;

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

const CLOSINGS: &[&str] = &["bye", "goodbye", "thanks", "thank you", "ok", "okay"];

/// Messages this short (in chars, after trimming) are not worth a retrieval.
const MIN_QUESTION_CHARS: usize = 3;

pub const CLOSING_REPLY: &str = "You're welcome 😊 Let me know if you need any help.";
pub const TOO_SHORT_REPLY: &str = "Hi 👋 Please type a full question so I can assist you.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting { name: Option<String> },
    Closing,
    TooShort,
    Question,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Greeting { .. } => "greeting",
            Intent::Closing => "closing",
            Intent::TooShort => "too_short",
            Intent::Question => "question",
        }
    }

    /// Canned reply for every intent except `Question`.
    pub fn canned_reply(&self, hour: u32) -> Option<String> {
        match self {
            Intent::Greeting { name } => Some(greeting_reply(hour, name.as_deref())),
            Intent::Closing => Some(CLOSING_REPLY.to_string()),
            Intent::TooShort => Some(TOO_SHORT_REPLY.to_string()),
            Intent::Question => None,
        }
    }
}

pub struct IntentClassifier {
    name_pattern: Regex,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(r"(i am|i'm|my name is|this is)\s+([A-Za-z]+)")
                .expect("Invalid name regex"),
        }
    }

    pub fn classify(&self, message: &str) -> Intent {
        let clean = message.trim().to_lowercase();

        if GREETINGS.iter().any(|g| clean.starts_with(g)) {
            return Intent::Greeting {
                name: self.extract_name(&clean),
            };
        }

        if CLOSINGS.iter().any(|c| clean.contains(c)) {
            return Intent::Closing;
        }

        if clean.chars().count() < MIN_QUESTION_CHARS {
            return Intent::TooShort;
        }

        Intent::Question
    }

    /// Self-introduced name ("I'm dana" → "Dana"), if any.
    fn extract_name(&self, clean: &str) -> Option<String> {
        self.name_pattern
            .captures(clean)
            .and_then(|caps| caps.get(2))
            .map(|m| capitalize(m.as_str()))
    }
}

pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn greeting_reply(hour: u32, name: Option<&str>) -> String {
    let name_suffix = name.map(|n| format!(", {n}")).unwrap_or_default();
    format!(
        "{} 👋\n\n\
         I’m {ASSISTANT_NAME}, your HR AI Assistant{name_suffix}.\n\
         I can assist with leave, salary policy, benefits and onboarding.\n\n\
         How can I help you today?",
        time_greeting(hour)
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
