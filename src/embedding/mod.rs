//! Embedding generation
//!
//! Trait-based embedding interface with a hosted service client and
//! deterministic in-process implementations for tests and offline use.

use crate::error::Result;

pub mod offline;
pub mod openai;

// Re-exports
pub use offline::{HashingEmbedder, MockEmbedder};
pub use openai::{OpenAiEmbedder, OpenAiEmbeddingConfig};

/// An embedding vector.
pub type Embedding = Vec<f32>;

/// Trait for embedding models.
///
/// All vectors produced by one implementation share a fixed dimension, and
/// the pipeline refuses to mix vectors from different model identities.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed multiple texts, preserving input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Dimension of the produced vectors.
    fn dimension(&self) -> usize;

    /// Identity of the embedding model.
    fn model_name(&self) -> &str;
}

/// L2-normalize an embedding in place. A zero vector is left unchanged.
pub fn normalize_embedding(embedding: &mut Embedding) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in embedding.iter_mut() {
            *val /= norm;
        }
    }
}

/// Cosine similarity between two embeddings.
///
/// Returns 0.0 for mismatched dimensions or zero-norm inputs; the index
/// rejects such vectors before they ever reach scoring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_embedding() {
        let mut emb = vec![3.0, 4.0];
        normalize_embedding(&mut emb);
        assert!((emb[0] - 0.6).abs() < 1e-6);
        assert!((emb[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize_embedding(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let v = vec![0.2, -0.4, 0.9, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-2.0, 0.5, 1.5];
        assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_and_degenerate() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_similarity(&a, &b)).abs() < 1e-6);

        assert_eq!(cosine_similarity(&[0.0, 0.0], &a), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &a), 0.0);
    }
}
