//! Command-line interface
//!
//! Presentation layer for the pipeline: argument handling, secret pickup,
//! and output formatting. The pipeline handle is constructed here and passed
//! explicitly; there is no process-wide singleton.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::RagConfig;
use crate::data::MultiFormatLoader;
use crate::embedding::{Embedder, HashingEmbedder, OpenAiEmbedder, OpenAiEmbeddingConfig};
use crate::evaluation::{load_eval_set, sweep};
use crate::rag::generator::GenerationConfig;
use crate::rag::{OpenAiGenerationConfig, OpenAiGenerator, RagPipelineBuilder, RagQuery};

/// Question substituted when the user submits empty input. Defaulting is a
/// boundary concern; the core rejects empty questions outright.
pub const DEFAULT_QUESTION: &str = "How do I trade with other players?";

/// Vector dimension for the offline hashing embedder.
const OFFLINE_DIMENSION: usize = 512;

fn api_key_from_env() -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; export it or pass --offline where supported")
}

fn hosted_embedder(model: &str) -> Result<Arc<dyn Embedder>> {
    let key = api_key_from_env()?;
    let embedder = OpenAiEmbedder::new(OpenAiEmbeddingConfig::new(model, &key))?;
    Ok(Arc::new(embedder))
}

/// Execute the ask command: build the index and answer one question.
pub fn ask(
    document: String,
    question: Option<String>,
    top_k: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    template: String,
    embedding_model: String,
    generation_model: String,
    show_context: bool,
) -> Result<()> {
    let question = match question.map(|q| q.trim().to_string()) {
        Some(q) if !q.is_empty() => q,
        _ => {
            tracing::info!("no question given, using the stock question");
            DEFAULT_QUESTION.to_string()
        }
    };

    tracing::info!("Document: {}", document);
    tracing::info!("Question: {}", question);

    let key = api_key_from_env()?;
    let config = RagConfig::default()
        .with_chunking(chunk_size, chunk_overlap)
        .with_top_k(top_k)
        .with_template(&template)
        .with_models(&embedding_model, &generation_model);

    let embedder = hosted_embedder(&config.embedding_model_id)?;
    let generator = OpenAiGenerator::new(OpenAiGenerationConfig::new(
        GenerationConfig::new(&config.generation_model_id),
        &key,
    ))?;

    let mut pipeline = RagPipelineBuilder::new()
        .embedder(embedder)
        .generator(Box::new(generator))
        .config(config)
        .build()?;

    pipeline.initialize(Path::new(&document), chunk_size, chunk_overlap)?;

    let response = pipeline.answer_query(
        RagQuery::new(&question)
            .with_top_k(top_k)
            .with_context(show_context),
    )?;

    println!("\nQuestion: {}", question);
    println!("\nAnswer: {}", response.answer);
    if show_context {
        println!("\nSource passages:");
        for (i, passage) in response.context.iter().enumerate() {
            println!("  [{}] {}", i + 1, passage);
        }
    }
    println!(
        "\nTiming: retrieval={}ms, generation={}ms",
        response.retrieval_time_ms, response.generation_time_ms
    );

    Ok(())
}

/// Execute the eval command: sweep the parameter grid and report retrieval
/// metrics for each point.
pub fn eval(
    document: String,
    data: String,
    chunk_sizes: Vec<usize>,
    chunk_overlaps: Vec<usize>,
    top_k_values: Vec<usize>,
    embedding_model: String,
    offline: bool,
) -> Result<()> {
    tracing::info!("Document: {}", document);
    tracing::info!("Eval set: {}", data);

    let samples = load_eval_set(Path::new(&data))?;
    let doc = MultiFormatLoader::new().load(Path::new(&document))?;

    let embedder: Arc<dyn Embedder> = if offline {
        tracing::info!("using the offline hashing embedder");
        Arc::new(HashingEmbedder::new(OFFLINE_DIMENSION))
    } else {
        hosted_embedder(&embedding_model)?
    };

    let reports = sweep(
        &doc,
        embedder,
        &samples,
        &chunk_sizes,
        &chunk_overlaps,
        &top_k_values,
    )?;

    println!("\nRetrieval evaluation ({} samples):", samples.len());
    println!(
        "{:>10} {:>8} {:>6} {:>9} {:>8} {:>7}",
        "chunk_size", "overlap", "k", "hit_rate", "recall", "mrr"
    );
    for (point, report) in &reports {
        println!(
            "{:>10} {:>8} {:>6} {:>9.3} {:>8.3} {:>7.3}",
            point.chunk_size,
            point.chunk_overlap,
            point.top_k,
            report.hit_rate,
            report.mean_recall,
            report.mrr
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_question_is_nonempty() {
        assert!(!DEFAULT_QUESTION.trim().is_empty());
    }
}
