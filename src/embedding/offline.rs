//! Deterministic in-process embedders
//!
//! Network-free [`Embedder`] implementations. `MockEmbedder` is the fake used
//! by unit tests; `HashingEmbedder` gives token-overlap-driven similarity, so
//! retrieval behaves sensibly without a hosted model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::embedding::{normalize_embedding, Embedder, Embedding};
use crate::error::Result;

/// Embedder producing deterministic pseudo-random vectors from a text hash.
///
/// Unrelated texts map to unrelated directions, which is all the unit tests
/// need.
pub struct MockEmbedder {
    model_name: String,
    dimension: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the given vector dimension.
    pub fn new(model_name: &str, dimension: usize) -> Self {
        Self {
            model_name: model_name.to_string(),
            dimension,
        }
    }

    fn generate(&self, text: &str) -> Embedding {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        let mut embedding = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            // LCG keeps the output reproducible across runs.
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            let value = ((state >> 16) % 10_000) as f32 / 10_000.0 - 0.5;
            embedding.push(value);
        }

        normalize_embedding(&mut embedding);
        embedding
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.generate(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.generate(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Bag-of-tokens embedder using feature hashing.
///
/// Each lowercased token is hashed to a slot; texts sharing tokens get
/// positive cosine similarity. Deterministic, so retrieval over it is
/// reproducible end to end.
pub struct HashingEmbedder {
    model_name: String,
    dimension: usize,
}

impl HashingEmbedder {
    /// Create a hashing embedder with the given vector dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "hashing-bag-of-tokens".to_string(),
            dimension,
        }
    }

    fn generate(&self, text: &str) -> Embedding {
        let mut embedding = vec![0.0; self.dimension];

        let tokens: Vec<String> = text
            .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();

        if tokens.is_empty() {
            // Reserved slot so even token-free text gets a non-zero vector;
            // the index treats zero-norm vectors as invariant violations.
            embedding[0] = 1.0;
            return embedding;
        }

        for token in &tokens {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dimension;
            embedding[idx] += 1.0;
        }

        normalize_embedding(&mut embedding);
        embedding
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.generate(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.generate(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
