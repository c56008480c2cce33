//! Hosted generation service client
//!
//! OpenAI-compatible `/chat/completions` client with the same bounded-retry
//! discipline as the embedding client. No fallback answer is synthesized
//! locally; exhausted retries fail the enclosing operation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::rag::generator::{GenerationConfig, Generator};

/// Configuration for the hosted generation client.
#[derive(Debug, Clone)]
pub struct OpenAiGenerationConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Decoding settings.
    pub generation: GenerationConfig,
    /// Per-request timeout; expiry counts as a transient failure.
    pub timeout: Duration,
    /// Total attempts per request before giving up.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent one.
    pub initial_backoff: Duration,
}

impl OpenAiGenerationConfig {
    /// Config for the given decoding settings and API key.
    pub fn new(generation: GenerationConfig, api_key: &str) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.to_string(),
            generation,
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Generator backed by a hosted OpenAI-compatible chat-completion service.
pub struct OpenAiGenerator {
    client: Client,
    config: OpenAiGenerationConfig,
}

impl OpenAiGenerator {
    /// Create a client from the given configuration.
    pub fn new(config: OpenAiGenerationConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::Configuration(
                "generation service API key must not be empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::GenerationService(format!("failed to build client: {}", e)))?;
        Ok(Self { client, config })
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn extract_answer(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RagError::GenerationService("completion response had no choices".into()))
}

impl Generator for OpenAiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.generation.model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.generation.temperature,
            max_tokens: self.config.generation.max_tokens,
        };

        let mut backoff = self.config.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                tracing::warn!(
                    attempt,
                    max_attempts = self.config.max_attempts,
                    "retrying generation request after {}",
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
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let parsed: ChatResponse = response.json().map_err(|e| {
                    RagError::GenerationService(format!("malformed completion response: {}", e))
                })?;
                return extract_answer(parsed);
            }

            if !is_retryable(status) {
                let detail = response.text().unwrap_or_default();
                return Err(RagError::GenerationService(format!(
                    "completion request rejected with {}: {}",
                    status, detail
                )));
            }

            last_error = format!("status {}", status);
        }

        Err(RagError::GenerationService(format!(
            "completion request failed after {} attempts: {}",
            self.config.max_attempts, last_error
        )))
    }

    fn model_name(&self) -> &str {
        &self.config.generation.model_id
    }
}
