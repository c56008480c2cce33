//! # rulebook-qa
//!
//! Retrieval-augmented question answering over a single rulebook document.
//!
//! ## Overview
//!
//! The crate answers natural-language questions about one rulebook by
//! retrieving the most relevant passages and conditioning a hosted language
//! model on them:
//!
//! - `data` - document loading and sliding-window chunking
//! - `embedding` - hosted embedding client plus deterministic offline embedders
//! - `retrieval` - exact cosine vector index and dense retriever
//! - `rag` - prompt templates, assembly, generation, and the pipeline
//! - `evaluation` - retrieval metrics over a question/phrase eval set
//! - `cli` - command implementations for the binary
//!
//! The index is built once per process and is immutable afterwards; every
//! question is answered statelessly against it.

// Core modules
pub mod config;
pub mod data;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod rag;
pub mod retrieval;

// Presentation layer
pub mod cli;

// Re-export commonly used types
pub use config::{RagConfig, SimilarityMetric};
pub use error::{RagError, Result};
pub use rag::{RagPipeline, RagPipelineBuilder};
