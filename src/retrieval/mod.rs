//! Retrieval
//!
//! Exact cosine-similarity retrieval over an immutable in-memory index.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod dense;
pub mod index;

// Re-exports
pub use dense::EmbeddingRetriever;
pub use index::VectorIndex;

/// A retrieved chunk with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the retrieved chunk.
    pub chunk_id: usize,
    /// The chunk text.
    pub text: String,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
    /// Document-order position of the chunk, used for tie-breaking.
    pub sequence_index: usize,
    /// Rank in the result list (1-indexed).
    pub rank: usize,
}

/// Metadata recorded when an index is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Embedding model the vectors came from.
    pub model_name: String,
    /// Vector dimension shared by the whole index.
    pub dimension: usize,
    /// Number of chunks indexed.
    pub num_chunks: usize,
    /// Build timestamp.
    pub created_at: String,
}

/// Trait for retrieval engines.
pub trait Retriever: Send + Sync {
    /// Retrieve the top-k most relevant chunks for a question.
    fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>>;

    /// Name of this retriever.
    fn name(&self) -> &str;
}
