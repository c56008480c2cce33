//! Dense retrieval
//!
//! Embeds a question and looks it up in the vector index. This is the only
//! place query-time embedding happens; the corpus is embedded once at build.

use std::sync::Arc;

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::retrieval::{Retriever, SearchResult, VectorIndex};

/// Retriever pairing an embedder with an immutable vector index.
pub struct EmbeddingRetriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingRetriever {
    /// Create a retriever over a built index.
    ///
    /// The embedder must be the same model identity the index was built
    /// with; mixing vectors from different embedding models is forbidden.
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let metadata = index.metadata();
        if embedder.model_name() != metadata.model_name {
            return Err(RagError::Configuration(format!(
                "index was built with embedding model '{}' but the embedder is '{}'",
                metadata.model_name,
                embedder.model_name()
            )));
        }
        if embedder.dimension() != metadata.dimension {
            return Err(RagError::Configuration(format!(
                "index dimension {} does not match embedder dimension {}",
                metadata.dimension,
                embedder.dimension()
            )));
        }
        Ok(Self { index, embedder })
    }

    /// The underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

impl Retriever for EmbeddingRetriever {
    fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed(question)?;
        self.index.query(&query_vector, top_k)
    }

    fn name(&self) -> &str {
        "dense"
    }
}
