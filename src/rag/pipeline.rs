//! Pipeline orchestration
//!
//! Owns the index lifecycle (build once, answer many) and composes chunking,
//! embedding, retrieval, prompt assembly, and generation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::RagConfig;
use crate::data::{Document, MultiFormatLoader, SlidingWindowChunker};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::rag::context::{PromptAssembler, PromptTemplates};
use crate::rag::generator::Generator;
use crate::rag::query::{RagQuery, RagResponse};
use crate::retrieval::{EmbeddingRetriever, Retriever, VectorIndex};

/// Lifecycle state of the pipeline.
enum PipelineState {
    /// No index built yet, or the last rebuild failed.
    Uninitialized,
    /// Index built; questions are accepted.
    Ready { retriever: EmbeddingRetriever },
}

/// The question-answering pipeline.
///
/// One instance per process and document configuration; the presentation
/// layer holds the handle and passes it into each request. `answer` takes
/// `&self`, so concurrent questions against a ready pipeline need no
/// locking.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Box<dyn Generator>,
    assembler: PromptAssembler,
    config: RagConfig,
    state: PipelineState,
}

impl RagPipeline {
    /// Create an uninitialized pipeline (use [`RagPipelineBuilder`]).
    ///
    /// Validates the configuration, including that the configured template
    /// exists in the registry.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Box<dyn Generator>,
        templates: PromptTemplates,
        config: RagConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !templates.contains(&config.prompt_template_name) {
            return Err(RagError::Configuration(format!(
                "prompt template '{}' is not registered",
                config.prompt_template_name
            )));
        }
        Ok(Self {
            embedder,
            generator,
            assembler: PromptAssembler::with_templates(templates),
            config,
            state: PipelineState::Uninitialized,
        })
    }

    /// Whether the pipeline has a built index and accepts questions.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, PipelineState::Ready { .. })
    }

    /// The active configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load a document from disk and build the index.
    ///
    /// See [`RagPipeline::initialize_document`].
    pub fn initialize(
        &mut self,
        source: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<()> {
        let document = MultiFormatLoader::new().load(source)?;
        self.initialize_document(document, chunk_size, chunk_overlap)
    }

    /// Chunk, embed, and index a document.
    ///
    /// Idempotent: a repeat call discards the previous index and rebuilds.
    /// Parameter validation failures leave the previous state untouched;
    /// once the rebuild proper starts, any failure resets the pipeline to
    /// uninitialized rather than leaving it half-built.
    pub fn initialize_document(
        &mut self,
        document: Document,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<()> {
        let chunker = SlidingWindowChunker::new(chunk_size, chunk_overlap)?;
        let chunks = chunker.chunk(&document);
        if chunks.is_empty() {
            return Err(RagError::Configuration(format!(
                "document '{}' contains no text to index",
                document.id
            )));
        }

        tracing::info!(
            document = %document.id,
            chunks = chunks.len(),
            chunk_size,
            chunk_overlap,
            "building index"
        );

        // From here on the old index is gone; a failure below must not leave
        // a half-built state behind.
        self.state = PipelineState::Uninitialized;

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        let index = VectorIndex::build(chunks, embeddings, self.embedder.model_name())?;
        let retriever = EmbeddingRetriever::new(index, Arc::clone(&self.embedder))?;

        self.state = PipelineState::Ready { retriever };
        tracing::info!("index ready");
        Ok(())
    }

    /// Answer a question against the built index.
    ///
    /// Returns the generated answer and, when `return_context` is set, the
    /// retrieved passage texts in rank order (empty otherwise).
    pub fn answer(
        &self,
        question: &str,
        k: usize,
        return_context: bool,
    ) -> Result<(String, Vec<String>)> {
        let response = self.answer_query(
            RagQuery::new(question)
                .with_top_k(k)
                .with_context(return_context),
        )?;
        Ok((response.answer, response.context))
    }

    /// Answer a structured query.
    pub fn answer_query(&self, query: RagQuery) -> Result<RagResponse> {
        let retriever = match &self.state {
            PipelineState::Ready { retriever } => retriever,
            PipelineState::Uninitialized => return Err(RagError::NotReady),
        };

        if query.question.trim().is_empty() {
            return Err(RagError::Configuration(
                "question must not be empty".into(),
            ));
        }

        let retrieval_start = Instant::now();
        let results = retriever.retrieve(&query.question, query.top_k)?;
        let retrieval_time_ms = retrieval_start.elapsed().as_millis() as u64;

        let prompt = self.assembler.assemble(
            &self.config.prompt_template_name,
            &results,
            &query.question,
        )?;

        let generation_start = Instant::now();
        let answer = self.generator.generate(&prompt)?;
        let generation_time_ms = generation_start.elapsed().as_millis() as u64;

        tracing::debug!(
            retrieved = results.len(),
            retrieval_time_ms,
            generation_time_ms,
            "answered question"
        );

        let context = if query.return_context {
            results.into_iter().map(|r| r.text).collect()
        } else {
            Vec::new()
        };

        Ok(RagResponse {
            answer,
            context,
            retrieval_time_ms,
            generation_time_ms,
        })
    }

    /// The retriever, when the pipeline is ready. Used by the evaluation
    /// harness to score retrieval without generating answers.
    pub fn retriever(&self) -> Result<&EmbeddingRetriever> {
        match &self.state {
            PipelineState::Ready { retriever } => Ok(retriever),
            PipelineState::Uninitialized => Err(RagError::NotReady),
        }
    }
}

/// Builder for [`RagPipeline`].
pub struct RagPipelineBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Box<dyn Generator>>,
    templates: PromptTemplates,
    config: RagConfig,
}

impl RagPipelineBuilder {
    /// Create a builder with default templates and configuration.
    pub fn new() -> Self {
        Self {
            embedder: None,
            generator: None,
            templates: PromptTemplates::default(),
            config: RagConfig::default(),
        }
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generator.
    pub fn generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Replace the template registry.
    pub fn templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<RagPipeline> {
        let embedder = self.embedder.ok_or_else(|| {
            RagError::Configuration("an embedder is required to build the pipeline".into())
        })?;
        let generator = self.generator.ok_or_else(|| {
            RagError::Configuration("a generator is required to build the pipeline".into())
        })?;
        RagPipeline::new(embedder, generator, self.templates, self.config)
    }
}

impl Default for RagPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{normalize_embedding, MockEmbedder};

    /// Embedder fake with a fixed vocabulary: one dimension per known word
    /// plus a shared slot for anything else, so token overlap maps to
    /// similarity with no hash collisions to worry about.
    struct KeywordEmbedder {
        vocab: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                vocab: vec![
                    "roll", "two", "dice", "robber", "moves", "on", "7", "trade", "with",
                    "other", "players", "what", "happens",
                ],
            })
        }
    }

    impl Embedder for KeywordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0; self.vocab.len() + 1];
            for token in text
                .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
                .filter(|s| !s.is_empty())
            {
                match self.vocab.iter().position(|w| *w == token.to_lowercase()) {
                    Some(slot) => vector[slot] += 1.0,
                    None => *vector.last_mut().unwrap() += 1.0,
                }
            }
            normalize_embedding(&mut vector);
            if vector.iter().all(|v| *v == 0.0) {
                vector[0] = 1.0;
            }
            Ok(vector)
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            self.vocab.len() + 1
        }

        fn model_name(&self) -> &str {
            "keyword-vocab"
        }
    }

    /// Generator fake that records nothing and returns a canned answer.
    struct CannedGenerator {
        answer: String,
    }

    impl CannedGenerator {
        fn new(answer: &str) -> Box<Self> {
            Box::new(Self {
                answer: answer.to_string(),
            })
        }
    }

    impl Generator for CannedGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            assert!(!prompt.is_empty());
            Ok(self.answer.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    /// Embedder fake that always fails, for rebuild-failure tests.
    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RagError::EmbeddingService("service unavailable".into()))
        }

        fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Err(RagError::EmbeddingService("service unavailable".into()))
        }

        fn dimension(&self) -> usize {
            256
        }

        fn model_name(&self) -> &str {
            "always-failing"
        }
    }

    fn pipeline() -> RagPipeline {
        RagPipelineBuilder::new()
            .embedder(KeywordEmbedder::new())
            .generator(CannedGenerator::new("The robber moves to a new hex."))
            .build()
            .unwrap()
    }

    // With chunk_size 20 and overlap 5 the stride is 15, so windows start at
    // offsets 0, 15, 30, ... and the whole "Robber moves on 7." sentence
    // lands in the window starting at 15.
    fn rulebook() -> Document {
        Document::new(
            "rulebook",
            "Roll two dice. Robber moves on 7. Trade with other players.",
        )
    }

    #[test]
    fn test_answer_before_initialize_is_not_ready() {
        let pipeline = pipeline();
        assert!(!pipeline.is_ready());
        assert!(matches!(
            pipeline.answer("What happens on 7?", 1, false),
            Err(RagError::NotReady)
        ));
    }

    #[test]
    fn test_end_to_end_answer_with_context() {
        let mut pipeline = pipeline();
        pipeline.initialize_document(rulebook(), 20, 5).unwrap();
        assert!(pipeline.is_ready());

        let (answer, context) = pipeline.answer("What happens on 7?", 1, true).unwrap();
        assert!(!answer.is_empty());
        assert_eq!(context.len(), 1);
        assert!(context[0].contains("Robber moves on 7"));
    }

    #[test]
    fn test_context_empty_when_not_requested() {
        let mut pipeline = pipeline();
        pipeline.initialize_document(rulebook(), 20, 5).unwrap();

        let (_, context) = pipeline.answer("What happens on 7?", 2, false).unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn test_empty_question_rejected() {
        let mut pipeline = pipeline();
        pipeline.initialize_document(rulebook(), 20, 5).unwrap();

        assert!(matches!(
            pipeline.answer("", 1, false),
            Err(RagError::Configuration(_))
        ));
        assert!(pipeline.answer("   \n", 1, false).is_err());
    }

    #[test]
    fn test_invalid_chunk_params_leave_prior_state() {
        let mut pipeline = pipeline();
        pipeline.initialize_document(rulebook(), 20, 5).unwrap();

        // Overlap >= size fails validation; the earlier index must survive.
        assert!(matches!(
            pipeline.initialize_document(rulebook(), 20, 20),
            Err(RagError::Configuration(_))
        ));
        assert!(pipeline.is_ready());
        assert!(pipeline.answer("What happens on 7?", 1, false).is_ok());
    }

    #[test]
    fn test_invalid_chunk_params_before_first_build_stay_uninitialized() {
        let mut pipeline = pipeline();
        assert!(pipeline.initialize_document(rulebook(), 10, 10).is_err());
        assert!(!pipeline.is_ready());
    }

    #[test]
    fn test_failed_rebuild_resets_to_uninitialized() {
        let mut pipeline = RagPipelineBuilder::new()
            .embedder(Arc::new(FailingEmbedder))
            .generator(CannedGenerator::new("unused"))
            .build()
            .unwrap();

        assert!(matches!(
            pipeline.initialize_document(rulebook(), 20, 5),
            Err(RagError::EmbeddingService(_))
        ));
        assert!(!pipeline.is_ready());
        assert!(matches!(
            pipeline.answer("anything", 1, false),
            Err(RagError::NotReady)
        ));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut pipeline = pipeline();
        pipeline.initialize_document(rulebook(), 20, 5).unwrap();
        let first = pipeline.retriever().unwrap().index().len();

        pipeline.initialize_document(rulebook(), 20, 5).unwrap();
        assert_eq!(pipeline.retriever().unwrap().index().len(), first);
    }

    #[test]
    fn test_empty_document_rejected() {
        let mut pipeline = pipeline();
        assert!(matches!(
            pipeline.initialize_document(Document::new("empty", "   "), 20, 5),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn test_k_clamped_to_chunk_count() {
        let mut pipeline = pipeline();
        pipeline
            .initialize_document(Document::new("tiny", "Robber moves on 7."), 50, 10)
            .unwrap();

        let (_, context) = pipeline.answer("What happens on 7?", 10, true).unwrap();
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_unknown_configured_template_rejected_at_build() {
        let err = RagPipelineBuilder::new()
            .embedder(Arc::new(MockEmbedder::new("mock", 64)))
            .generator(CannedGenerator::new("unused"))
            .config(RagConfig::default().with_template("no-such-template"))
            .build();
        assert!(matches!(err, Err(RagError::Configuration(_))));
    }
}
