//! Error types for the question-answering pipeline
//!
//! Every fallible operation in the crate returns [`RagError`] so callers can
//! distinguish configuration mistakes from external service failures.

use thiserror::Error;

/// Errors surfaced by the pipeline and its components.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking, template, or query parameters. Fatal at
    /// initialization time and never retried.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The embedding service failed after exhausting bounded retries.
    /// Fatal for the enclosing operation; no partial index is ever kept.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// The generation service failed after exhausting bounded retries.
    /// No fallback answer is synthesized locally.
    #[error("generation service error: {0}")]
    GenerationService(String),

    /// An operation that requires a built index was invoked before a
    /// successful `initialize`.
    #[error("pipeline is not initialized; call initialize first")]
    NotReady,

    /// Internal index invariant violation, e.g. a zero-norm vector or a
    /// chunk/vector count mismatch. Indicates a data or service contract
    /// breach.
    #[error("index invariant violated: {0}")]
    Index(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::Configuration("chunk_overlap must be smaller than chunk_size".into());
        assert!(err.to_string().contains("invalid configuration"));

        let err = RagError::NotReady;
        assert!(err.to_string().contains("not initialized"));
    }
}
