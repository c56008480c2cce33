//! Retrieval evaluation
//!
//! Scores retrieval quality against a JSON eval set of questions, each
//! annotated with a phrase the relevant rulebook passage must contain.
//! Metrics: hit rate at k, mean recall at k, MRR.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{Document, SlidingWindowChunker};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::retrieval::{EmbeddingRetriever, Retriever, VectorIndex};

/// One evaluation question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSample {
    /// The question to retrieve for.
    pub question: String,
    /// A phrase that identifies the relevant passage(s). Matching is
    /// case-insensitive.
    pub expected_phrase: String,
}

/// Load an eval set from a JSON file (an array of samples).
pub fn load_eval_set(path: &Path) -> Result<Vec<EvalSample>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        RagError::Configuration(format!("failed to read eval set {:?}: {}", path, e))
    })?;
    let samples: Vec<EvalSample> = serde_json::from_str(&raw).map_err(|e| {
        RagError::Configuration(format!("failed to parse eval set {:?}: {}", path, e))
    })?;
    if samples.is_empty() {
        return Err(RagError::Configuration(format!(
            "eval set {:?} contains no samples",
            path
        )));
    }
    Ok(samples)
}

/// Aggregate retrieval metrics over an eval set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalReport {
    /// Questions evaluated.
    pub num_queries: usize,
    /// Questions where a relevant chunk appeared in the top-k.
    pub hits: usize,
    /// Fraction of questions with at least one relevant chunk retrieved.
    pub hit_rate: f64,
    /// Mean recall@k across questions.
    pub mean_recall: f64,
    /// Mean reciprocal rank of the first relevant chunk.
    pub mrr: f64,
}

impl std::fmt::Display for RetrievalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "queries={} hits={} hit_rate={:.3} recall={:.3} mrr={:.3}",
            self.num_queries, self.hits, self.hit_rate, self.mean_recall, self.mrr
        )
    }
}

/// Evaluate retrieval over a built index.
///
/// A sample whose phrase matches no chunk counts as a miss; that usually
/// means the chunk window cut straight through the expected passage.
pub fn evaluate_retrieval(
    retriever: &EmbeddingRetriever,
    samples: &[EvalSample],
    k: usize,
) -> Result<RetrievalReport> {
    let chunks = retriever.index().chunks();

    let mut hits = 0;
    let mut recall_sum = 0.0;
    let mut rr_sum = 0.0;

    for sample in samples {
        let phrase = sample.expected_phrase.to_lowercase();
        let relevant: HashSet<usize> = chunks
            .iter()
            .filter(|c| c.text.to_lowercase().contains(&phrase))
            .map(|c| c.id)
            .collect();

        if relevant.is_empty() {
            tracing::warn!(
                question = %sample.question,
                phrase = %sample.expected_phrase,
                "expected phrase matches no chunk; counting as a miss"
            );
            continue;
        }

        let results = retriever.retrieve(&sample.question, k)?;
        let retrieved_relevant = results
            .iter()
            .filter(|r| relevant.contains(&r.chunk_id))
            .count();

        recall_sum += retrieved_relevant as f64 / relevant.len() as f64;

        if let Some(first) = results.iter().position(|r| relevant.contains(&r.chunk_id)) {
            hits += 1;
            rr_sum += 1.0 / (first + 1) as f64;
        }
    }

    let n = samples.len() as f64;
    Ok(RetrievalReport {
        num_queries: samples.len(),
        hits,
        hit_rate: hits as f64 / n,
        mean_recall: recall_sum / n,
        mrr: rr_sum / n,
    })
}

/// One point in a chunking/retrieval parameter sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridPoint {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

/// Evaluate every combination of the given parameter grids.
///
/// Builds a fresh index per chunking combination, so each point costs one
/// full embedding pass over the document.
pub fn sweep(
    document: &Document,
    embedder: Arc<dyn Embedder>,
    samples: &[EvalSample],
    chunk_sizes: &[usize],
    chunk_overlaps: &[usize],
    top_k_values: &[usize],
) -> Result<Vec<(GridPoint, RetrievalReport)>> {
    let mut reports = Vec::new();

    for &chunk_size in chunk_sizes {
        for &chunk_overlap in chunk_overlaps {
            let chunker = SlidingWindowChunker::new(chunk_size, chunk_overlap)?;
            let chunks = chunker.chunk(document);
            if chunks.is_empty() {
                return Err(RagError::Configuration(format!(
                    "document '{}' contains no text to index",
                    document.id
                )));
            }

            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            let embeddings = embedder.embed_batch(&texts)?;
            let index = VectorIndex::build(chunks, embeddings, embedder.model_name())?;
            let retriever = EmbeddingRetriever::new(index, Arc::clone(&embedder))?;

            for &top_k in top_k_values {
                let report = evaluate_retrieval(&retriever, samples, top_k)?;
                tracing::info!(
                    chunk_size,
                    chunk_overlap,
                    top_k,
                    %report,
                    "sweep point"
                );
                reports.push((
                    GridPoint {
                        chunk_size,
                        chunk_overlap,
                        top_k,
                    },
                    report,
                ));
            }
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn retriever(doc_text: &str, chunk_size: usize, overlap: usize) -> EmbeddingRetriever {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(4096));
        let chunker = SlidingWindowChunker::new(chunk_size, overlap).unwrap();
        let chunks = chunker.chunk(&Document::new("doc", doc_text));
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).unwrap();
        let index = VectorIndex::build(chunks, embeddings, embedder.model_name()).unwrap();
        EmbeddingRetriever::new(index, embedder).unwrap()
    }

    #[test]
    fn test_evaluate_scores_a_hit() {
        let retriever = retriever(
            "Roll two dice. Robber moves on 7. Trade with other players.",
            20,
            5,
        );
        let samples = vec![EvalSample {
            question: "What happens on 7?".to_string(),
            expected_phrase: "robber moves".to_string(),
        }];

        let report = evaluate_retrieval(&retriever, &samples, 2).unwrap();
        assert_eq!(report.num_queries, 1);
        assert_eq!(report.hits, 1);
        assert!(report.hit_rate > 0.99);
        assert!(report.mrr > 0.0);
    }

    #[test]
    fn test_unmatched_phrase_counts_as_miss() {
        let retriever = retriever("Roll two dice. Trade with other players.", 30, 5);
        let samples = vec![EvalSample {
            question: "What about the robber?".to_string(),
            expected_phrase: "no such passage".to_string(),
        }];

        let report = evaluate_retrieval(&retriever, &samples, 2).unwrap();
        assert_eq!(report.hits, 0);
        assert_eq!(report.hit_rate, 0.0);
    }

    #[test]
    fn test_sweep_covers_the_grid() {
        let document = Document::new(
            "doc",
            "Roll two dice. Robber moves on 7. Trade with other players.",
        );
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(128));
        let samples = vec![EvalSample {
            question: "What happens on 7?".to_string(),
            expected_phrase: "robber".to_string(),
        }];

        let reports = sweep(&document, embedder, &samples, &[20, 30], &[5], &[1, 3]).unwrap();
        assert_eq!(reports.len(), 4);
    }

    #[test]
    fn test_load_eval_set_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");

        std::fs::write(&path, "not json").unwrap();
        assert!(load_eval_set(&path).is_err());

        std::fs::write(&path, "[]").unwrap();
        assert!(load_eval_set(&path).is_err());

        std::fs::write(
            &path,
            r#"[{"question":"How do you win?","expected_phrase":"victory points"}]"#,
        )
        .unwrap();
        let samples = load_eval_set(&path).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].expected_phrase, "victory points");
    }
}
