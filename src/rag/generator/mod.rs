//! Answer generation
//!
//! Trait-based abstraction over the hosted language model so tests can
//! substitute a deterministic fake without network access.

pub mod openai;

pub use openai::{OpenAiGenerator, OpenAiGenerationConfig};

use crate::error::Result;

/// Trait for answer generators.
pub trait Generator: Send + Sync {
    /// Generate a completion for the assembled prompt.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Identity of the generation model.
    fn model_name(&self) -> &str;
}

/// Decoding settings for generation.
///
/// Temperature defaults to zero: rules lookup wants reproducible,
/// low-variance answers.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Generation model identifier.
    pub model_id: String,
    /// Decoding temperature.
    pub temperature: f32,
    /// Cap on generated tokens, if any.
    pub max_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

impl GenerationConfig {
    /// Config for the given model id.
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            ..Default::default()
        }
    }

    /// Set the decoding temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the generated-token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_deterministic_decoding() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.model_id, "gpt-3.5-turbo");
        assert!(config.max_tokens.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = GenerationConfig::new("gpt-4o-mini")
            .with_temperature(0.1)
            .with_max_tokens(512);
        assert_eq!(config.model_id, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_tokens, Some(512));
    }
}
