//! Retrieval-augmented question answering
//!
//! Composes retrieval with hosted generation for rulebook Q&A.
//!
//! # Architecture
//!
//! ```text
//! Document
//!     │  (once, at initialize)
//!     ▼
//! Chunker ─▶ Embedder ─▶ VectorIndex
//!
//! Question
//!     │  (per query)
//!     ▼
//! Retriever ─▶ PromptAssembler ─▶ Generator ─▶ answer + context
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rulebook_qa::embedding::HashingEmbedder;
//! use rulebook_qa::rag::{RagPipelineBuilder, OpenAiGenerator, OpenAiGenerationConfig};
//! use rulebook_qa::rag::generator::GenerationConfig;
//!
//! # fn main() -> rulebook_qa::Result<()> {
//! let generator = OpenAiGenerator::new(OpenAiGenerationConfig::new(
//!     GenerationConfig::default(),
//!     "sk-...",
//! ))?;
//!
//! let mut pipeline = RagPipelineBuilder::new()
//!     .embedder(Arc::new(HashingEmbedder::new(256)))
//!     .generator(Box::new(generator))
//!     .build()?;
//!
//! pipeline.initialize(std::path::Path::new("rules.txt"), 125, 120)?;
//! let (answer, context) = pipeline.answer("What happens on 7?", 5, true)?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod generator;
pub mod pipeline;
pub mod query;

// Re-exports for convenience
pub use context::{PromptAssembler, PromptTemplates};
pub use generator::{Generator, OpenAiGenerationConfig, OpenAiGenerator};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use query::{RagQuery, RagResponse};
