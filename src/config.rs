//! Pipeline configuration
//!
//! The recognized configuration surface for the question-answering system.
//! Values default to the settings the rulebook demo ships with.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Similarity metric used by the vector index.
///
/// Fixed to cosine for the whole index; the variant exists so configuration
/// files can state the metric explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Normalized dot-product similarity, range [-1, 1].
    #[default]
    Cosine,
}

/// Configuration for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk window size in characters.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters. Must be smaller
    /// than `chunk_size`.
    pub chunk_overlap: usize,

    /// Number of chunks to retrieve per question.
    pub top_k: usize,

    /// Identifier of the hosted embedding model.
    pub embedding_model_id: String,

    /// Identifier of the hosted generation model.
    pub generation_model_id: String,

    /// Similarity metric for retrieval.
    pub similarity_metric: SimilarityMetric,

    /// Name of the prompt template to render answers with. Must exist in
    /// the template registry handed to the pipeline.
    pub prompt_template_name: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 125,
            chunk_overlap: 120,
            top_k: 5,
            embedding_model_id: "text-embedding-ada-002".to_string(),
            generation_model_id: "gpt-3.5-turbo".to_string(),
            similarity_metric: SimilarityMetric::Cosine,
            prompt_template_name: "default".to_string(),
        }
    }
}

impl RagConfig {
    /// Set the chunking window.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the prompt template name.
    pub fn with_template(mut self, name: &str) -> Self {
        self.prompt_template_name = name.to_string();
        self
    }

    /// Set the hosted model identifiers.
    pub fn with_models(mut self, embedding_model_id: &str, generation_model_id: &str) -> Self {
        self.embedding_model_id = embedding_model_id.to_string();
        self.generation_model_id = generation_model_id.to_string();
        self
    }

    /// Validate the configuration.
    ///
    /// Template existence is checked separately by the pipeline, which owns
    /// the registry.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be a positive number of characters".into(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Configuration("top_k must be at least 1".into()));
        }
        if self.embedding_model_id.is_empty() {
            return Err(RagError::Configuration(
                "embedding_model_id must not be empty".into(),
            ));
        }
        if self.generation_model_id.is_empty() {
            return Err(RagError::Configuration(
                "generation_model_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}
