//! Document ingestion and chunking
//!
//! Loading the source rulebook from disk and splitting its text into
//! overlapping passages for embedding and retrieval.

use serde::{Deserialize, Serialize};

pub mod chunkers;
pub mod loaders;

// Re-exports for convenience
pub use chunkers::*;
pub use loaders::*;

/// A loaded source document. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier for the document (derived from its source path).
    pub id: String,
    /// Full extracted text content.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A contiguous passage of the source document, the unit of retrieval.
///
/// Produced once per index build and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier, unique within one build.
    pub id: usize,
    /// The passage text.
    pub text: String,
    /// Character offset of the passage in the normalized document text.
    pub start_offset: usize,
    /// Position in original document order. Used for deterministic
    /// tie-breaking during retrieval, never for ranking.
    pub sequence_index: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(id: usize, text: String, start_offset: usize, sequence_index: usize) -> Self {
        Self {
            id,
            text,
            start_offset,
            sequence_index,
        }
    }
}
