//! In-memory vector index
//!
//! Immutable-after-build mapping from chunk to embedding vector, queried with
//! an exact cosine scan. At single-rulebook scale (low thousands of chunks)
//! the O(n) scan per query is plenty, and exact scoring keeps tie-breaking
//! fully deterministic.

use std::cmp::Ordering;

use crate::data::Chunk;
use crate::embedding::{normalize_embedding, Embedding};
use crate::error::{RagError, Result};
use crate::retrieval::{IndexMetadata, SearchResult};

/// Immutable cosine-similarity index over a document's chunks.
///
/// Vectors are unit-normalized at build time so a query reduces to dot
/// products against a normalized query vector.
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Embedding>,
    metadata: IndexMetadata,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings.
    ///
    /// All-or-nothing: a count mismatch, inconsistent dimension, or
    /// zero-norm vector fails the whole build and nothing is published.
    pub fn build(
        chunks: Vec<Chunk>,
        embeddings: Vec<Embedding>,
        model_name: &str,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::Index(format!(
                "chunk count ({}) does not match embedding count ({})",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Err(RagError::Index("cannot build an index with no chunks".into()));
        }

        let dimension = embeddings[0].len();
        let mut vectors = Vec::with_capacity(embeddings.len());
        for (chunk, mut vector) in chunks.iter().zip(embeddings.into_iter()) {
            if vector.len() != dimension {
                return Err(RagError::Index(format!(
                    "chunk {} has dimension {} but the index expects {}",
                    chunk.id,
                    vector.len(),
                    dimension
                )));
            }
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm == 0.0 || !norm.is_finite() {
                return Err(RagError::Index(format!(
                    "chunk {} has a degenerate embedding (norm {})",
                    chunk.id, norm
                )));
            }
            normalize_embedding(&mut vector);
            vectors.push(vector);
        }

        let metadata = IndexMetadata {
            model_name: model_name.to_string(),
            dimension,
            num_chunks: chunks.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::debug!(
            num_chunks = metadata.num_chunks,
            dimension,
            model = model_name,
            "built vector index"
        );

        Ok(Self {
            chunks,
            vectors,
            metadata,
        })
    }

    /// Query the index for the top-k chunks by cosine similarity.
    ///
    /// `k` must be at least 1; values above the chunk count are clamped so
    /// retrieval stays total on tiny documents. Results are ordered by
    /// descending score with ties broken by ascending `sequence_index`.
    pub fn query(&self, query_vector: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::Configuration("top_k must be at least 1".into()));
        }
        if query_vector.len() != self.metadata.dimension {
            return Err(RagError::Index(format!(
                "query vector has dimension {} but the index expects {}",
                query_vector.len(),
                self.metadata.dimension
            )));
        }

        let norm: f32 = query_vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(RagError::Index(format!(
                "query vector is degenerate (norm {})",
                norm
            )));
        }
        let mut query = query_vector.clone();
        normalize_embedding(&mut query);

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| {
                let score: f32 = vector.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                (score, i)
            })
            .collect();

        scored.sort_by(|(score_a, idx_a), (score_b, idx_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    self.chunks[*idx_a]
                        .sequence_index
                        .cmp(&self.chunks[*idx_b].sequence_index)
                })
        });

        let k = k.min(self.chunks.len());
        let results = scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (score, idx))| {
                let chunk = &self.chunks[idx];
                SearchResult {
                    chunk_id: chunk.id,
                    text: chunk.text.clone(),
                    score,
                    sequence_index: chunk.sequence_index,
                    rank: rank + 1,
                }
            })
            .collect();

        Ok(results)
    }

    /// The indexed chunks, in document order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks. Build rejects this, so a live
    /// index never returns true.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Build metadata.
    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk::new(id, text.to_string(), id * 10, id)
    }

    fn build_index(vectors: Vec<Embedding>) -> VectorIndex {
        let chunks = (0..vectors.len())
            .map(|i| chunk(i, &format!("chunk {}", i)))
            .collect();
        VectorIndex::build(chunks, vectors, "mock").unwrap()
    }

    #[test]
    fn test_build_rejects_count_mismatch() {
        let err = VectorIndex::build(vec![chunk(0, "a")], vec![], "mock");
        assert!(matches!(err, Err(RagError::Index(_))));
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = VectorIndex::build(vec![], vec![], "mock");
        assert!(matches!(err, Err(RagError::Index(_))));
    }

    #[test]
    fn test_build_rejects_zero_norm_vector() {
        let err = VectorIndex::build(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0, 0.0], vec![0.0, 0.0]],
            "mock",
        );
        assert!(matches!(err, Err(RagError::Index(_))));
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let err = VectorIndex::build(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0, 0.0], vec![1.0]],
            "mock",
        );
        assert!(matches!(err, Err(RagError::Index(_))));
    }

    #[test]
    fn test_query_ranks_by_similarity() {
        let index = build_index(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
        ]);

        let results = index.query(&vec![1.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk_id, 0);
        assert_eq!(results[1].chunk_id, 2);
        assert_eq!(results[2].chunk_id, 1);

        // Scores are non-increasing and ranks 1-indexed.
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn test_query_tie_break_by_sequence_index() {
        // Identical vectors produce bit-identical scores.
        let index = build_index(vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ]);

        let results = index.query(&vec![1.0, 0.0], 3).unwrap();
        let order: Vec<usize> = results.iter().map(|r| r.sequence_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_query_clamps_k_to_chunk_count() {
        let index = build_index(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let results = index.query(&vec![1.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_query_rejects_k_zero() {
        let index = build_index(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            index.query(&vec![1.0, 0.0], 0),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn test_query_rejects_degenerate_query_vector() {
        let index = build_index(vec![vec![1.0, 0.0]]);
        assert!(matches!(
            index.query(&vec![0.0, 0.0], 1),
            Err(RagError::Index(_))
        ));
        assert!(matches!(
            index.query(&vec![1.0, 0.0, 0.0], 1),
            Err(RagError::Index(_))
        ));
    }

    #[test]
    fn test_query_is_deterministic() {
        let index = build_index(vec![
            vec![0.9, 0.1],
            vec![0.1, 0.9],
            vec![0.5, 0.5],
        ]);
        let query = vec![0.6, 0.4];

        let a = index.query(&query, 3).unwrap();
        let b = index.query(&query, 3).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.chunk_id, y.chunk_id);
            assert_eq!(x.score, y.score);
            assert_eq!(x.rank, y.rank);
        }
    }
}
