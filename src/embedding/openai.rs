//! Hosted embedding service client
//!
//! OpenAI-compatible `/embeddings` endpoint client. The core responsibilities
//! at this boundary are request batching, bounded retry with exponential
//! backoff, and failure propagation; the service itself is a collaborator.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::embedding::{Embedder, Embedding};
use crate::error::{RagError, Result};

/// Configuration for the hosted embedding client.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Embedding model identifier.
    pub model: String,
    /// Dimension of the model's vectors.
    pub dimensions: usize,
    /// Texts per request.
    pub batch_size: usize,
    /// Per-request timeout; expiry counts as a transient failure.
    pub timeout: Duration,
    /// Total attempts per request before giving up.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    pub initial_backoff: Duration,
}

impl OpenAiEmbeddingConfig {
    /// Config for the given model and API key, with service defaults.
    pub fn new(model: &str, api_key: &str) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            dimensions: 1536,
            batch_size: 64,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by a hosted OpenAI-compatible embedding service.
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbeddingConfig,
}

impl OpenAiEmbedder {
    /// Create a client from the given configuration.
    pub fn new(config: OpenAiEmbeddingConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::Configuration(
                "embedding service API key must not be empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::EmbeddingService(format!("failed to build client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Issue one embeddings request with bounded retries.
    fn request_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let mut backoff = self.config.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tracing::warn!(
                    attempt,
                    max_attempts = self.config.max_attempts,
                    "retrying embedding request after {}",
                    last_error
                );
                std::thread::sleep(backoff);
                backoff *= 2;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
            {
                Ok(response) => response,
                Err(e) => {
                    // Network errors and timeouts are transient.
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed: EmbeddingResponse = response.json().map_err(|e| {
                    RagError::EmbeddingService(format!("malformed embedding response: {}", e))
                })?;
                return restore_order(parsed, texts.len());
            }

            if !is_retryable(status) {
                let detail = response.text().unwrap_or_default();
                return Err(RagError::EmbeddingService(format!(
                    "embedding request rejected with {}: {}",
                    status, detail
                )));
            }

            last_error = format!("status {}", status);
        }

        Err(RagError::EmbeddingService(format!(
            "embedding request failed after {} attempts: {}",
            self.config.max_attempts, last_error
        )))
    }
}

/// Rate limiting and server-side failures are worth retrying; other client
/// errors are not.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Order the response items by their reported index and check completeness.
fn restore_order(response: EmbeddingResponse, expected: usize) -> Result<Vec<Embedding>> {
    let mut items = response.data;
    if items.len() != expected {
        return Err(RagError::EmbeddingService(format!(
            "embedding response returned {} vectors for {} inputs",
            items.len(),
            expected
        )));
    }
    items.sort_by_key(|item| item.index);
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.request_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| RagError::EmbeddingService("empty embedding response".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size) {
            vectors.extend(self.request_batch(batch)?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
