/// LLM Client: the single point of entry for all Groq API calls in hrbot.
///
/// ARCHITECTURAL RULE: No other module may call the chat-completions API directly.
/// Everything that needs a completion goes through the `LanguageModel` trait,
/// which `LlmClient` implements.
///
/// Model: llama-3.1-8b-instant at temperature 0 (hardcoded).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for all LLM calls in hrbot.
pub const MODEL: &str = "llama-3.1-8b-instant";
const TEMPERATURE: f32 = 0.0;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Text completion capability. Failures are always recoverable: callers pick
/// the substitute message that fits their context.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Extracts the trimmed text of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorBody,
}

#[derive(Debug, Deserialize)]
struct GroqErrorBody {
    message: String,
}

/// Outcome of one HTTP round trip to the completions endpoint.
enum Attempt {
    Done(LlmResponse),
    /// Transient failure (transport, 429, 5xx); worth another try.
    Transient(LlmError),
    Fatal(LlmError),
}

/// Groq chat-completions client. Cheap to clone; shares the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, api_key })
    }

    /// Sends `prompt` as a single user message and returns the raw response.
    /// Transient failures are retried with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<LlmResponse, LlmError> {
        let body = ChatRequest {
            model: MODEL,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&body).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Transient(e) if attempt >= MAX_ATTEMPTS => {
                    return Err(LlmError::RetriesExhausted {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Attempt::Transient(e) => {
                    let delay = backoff(attempt);
                    warn!("Groq attempt {attempt} failed ({e}); retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Attempt {
        let response = match self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Transient(LlmError::Http(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let error = LlmError::Api {
                status: status.as_u16(),
                message: parse_error_message(response.text().await.unwrap_or_default()),
            };
            return if is_transient(status) {
                Attempt::Transient(error)
            } else {
                Attempt::Fatal(error)
            };
        }

        match response.json::<LlmResponse>().await {
            Ok(parsed) => {
                if let Some(usage) = &parsed.usage {
                    debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Groq completion received"
                    );
                }
                Attempt::Done(parsed)
            }
            Err(e) => Attempt::Fatal(LlmError::Http(e)),
        }
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retrying after failed attempt `n` (1-based): 1s, 2s, 4s...
fn backoff(n: u32) -> Duration {
    Duration::from_secs(1 << (n - 1).min(5))
}

/// Pulls `error.message` out of a Groq error body, falling back to the raw body.
fn parse_error_message(body: String) -> String {
    serde_json::from_str::<GroqError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
