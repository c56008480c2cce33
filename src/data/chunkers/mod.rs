//! Sliding-window chunking
//!
//! Splits document text into fixed-size overlapping passages. Boundaries are
//! purely positional; runs of whitespace are collapsed first so overlapping
//! windows do not produce near-duplicate chunks around formatting artifacts.

use crate::data::{Chunk, Document};
use crate::error::{RagError, Result};

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Chunker that slides a fixed-size window across the document text.
///
/// The window has length `chunk_size` characters and advances by
/// `chunk_size - chunk_overlap` each step, starting at offset 0. The final
/// chunk may be shorter than `chunk_size`; it is never padded or dropped.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SlidingWindowChunker {
    /// Create a chunker, validating the window parameters.
    ///
    /// `chunk_size` must be positive and `chunk_overlap` strictly smaller
    /// than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be a positive number of characters".into(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split a document into ordered, overlapping chunks.
    ///
    /// Identical input always yields the identical chunk sequence. An empty
    /// (or all-whitespace) document yields no chunks.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let normalized = normalize_whitespace(&document.text);
        let chars: Vec<char> = normalized.chars().collect();

        let mut chunks = Vec::new();
        if chars.is_empty() {
            return chunks;
        }

        let stride = self.chunk_size - self.chunk_overlap;
        let mut start = 0;
        let mut sequence_index = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();
            chunks.push(Chunk::new(sequence_index, text, start, sequence_index));
            sequence_index += 1;
            start += stride;
        }

        tracing::debug!(
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            chunk_overlap = self.chunk_overlap,
            "chunked document {}",
            document.id
        );

        chunks
    }
}
