//! Embedding capability and its HTTP adapter.
//!
//! The same model must embed both the corpus and incoming questions; a
//! mismatch silently breaks retrieval, so the model id lives in one place
//! (`Config::embedding_model`) and is handed to the single `HttpEmbedder`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Maps texts to fixed-dimension vectors, preserving input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint
/// (text-embeddings-inference, Ollama, vLLM and friends all speak it).
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    url: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(url: String, model: String) -> Result<Self, EmbedError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.url)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        let vectors = into_ordered_vectors(body, texts.len())?;
        debug!("Embedded {} texts with {}", vectors.len(), self.model);
        Ok(vectors)
    }
}

/// Reorders response items by their `index` field and checks the count.
fn into_ordered_vectors(
    mut body: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    if body.data.len() != expected {
        return Err(EmbedError::CountMismatch {
            expected,
            actual: body.data.len(),
        });
    }
    body.data.sort_by_key(|item| item.index);
    Ok(body.data.into_iter().map(|item| item.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_reordered_by_index() {
        let body: EmbeddingResponse = serde_json::from_str(
            r#"{"object":"list","data":[
                {"object":"embedding","index":1,"embedding":[0.0,1.0]},
                {"object":"embedding","index":0,"embedding":[1.0,0.0]}
            ],"model":"all-MiniLM-L6-v2"}"#,
        )
        .unwrap();
        let vectors = into_ordered_vectors(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#).unwrap();
        let err = into_ordered_vectors(body, 3).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::CountMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        // Unroutable URL: any request would fail, so success proves no call was made.
        let embedder =
            HttpEmbedder::new("http://127.0.0.1:9/v1/embeddings".into(), "m".into()).unwrap();
        let vectors = embedder.encode(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
