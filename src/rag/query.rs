//! Query and response types

use serde::{Deserialize, Serialize};

/// A question posed to the pipeline.
#[derive(Debug, Clone)]
pub struct RagQuery {
    /// The user's question.
    pub question: String,
    /// Number of passages to retrieve.
    pub top_k: usize,
    /// Whether to return the retrieved passage texts with the answer.
    pub return_context: bool,
}

impl RagQuery {
    /// Create a query with the default retrieval depth.
    pub fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            top_k: 5,
            return_context: false,
        }
    }

    /// Set the retrieval depth.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Request the retrieved passages alongside the answer.
    pub fn with_context(mut self, return_context: bool) -> Self {
        self.return_context = return_context;
        self
    }
}

/// The pipeline's answer to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Generated answer text.
    pub answer: String,
    /// Retrieved passage texts in rank order; empty unless requested.
    pub context: Vec<String>,
    /// Time spent embedding the question and scanning the index.
    pub retrieval_time_ms: u64,
    /// Time spent in the generation service.
    pub generation_time_ms: u64,
}

impl RagResponse {
    /// Total processing time in milliseconds.
    pub fn total_time_ms(&self) -> u64 {
        self.retrieval_time_ms + self.generation_time_ms
    }
}

impl std::fmt::Display for RagResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Answer: {}", self.answer)?;
        if !self.context.is_empty() {
            writeln!(f, "\nSources ({}):", self.context.len())?;
            for (i, passage) in self.context.iter().enumerate() {
                writeln!(f, "  [{}] {}", i + 1, passage)?;
            }
        }
        write!(
            f,
            "\nTiming: retrieval={}ms, generation={}ms, total={}ms",
            self.retrieval_time_ms,
            self.generation_time_ms,
            self.total_time_ms()
        )
    }
}
