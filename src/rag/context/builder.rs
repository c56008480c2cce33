//! Prompt assembly
//!
//! Joins retrieved passages into a context block and renders a named
//! template with the context and question substituted.

use crate::error::Result;
use crate::rag::context::templates::{
    PromptTemplates, CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER,
};
use crate::retrieval::SearchResult;

/// Separator between passages in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Assembles prompts from retrieved passages and a question.
pub struct PromptAssembler {
    templates: PromptTemplates,
}

impl PromptAssembler {
    /// Create an assembler with the default template registry.
    pub fn new() -> Self {
        Self {
            templates: PromptTemplates::default(),
        }
    }

    /// Create an assembler with a custom registry.
    pub fn with_templates(templates: PromptTemplates) -> Self {
        Self { templates }
    }

    /// Concatenate passage texts in retrieval-rank order.
    pub fn build_context(&self, results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Render the named template with context and question substituted
    /// exactly once each.
    pub fn assemble(
        &self,
        template_name: &str,
        results: &[SearchResult],
        question: &str,
    ) -> Result<String> {
        let template = self.templates.get(template_name)?;
        let context = self.build_context(results);
        Ok(render(template, &context, question))
    }

    /// The underlying registry.
    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute both placeholders by position in a single pass, so substituted
/// values are never re-scanned for placeholder text of their own.
fn render(template: &str, context: &str, question: &str) -> String {
    // Registration guarantees each placeholder occurs exactly once.
    let mut slots: Vec<(usize, &str, &str)> = Vec::with_capacity(2);
    if let Some(pos) = template.find(CONTEXT_PLACEHOLDER) {
        slots.push((pos, CONTEXT_PLACEHOLDER, context));
    }
    if let Some(pos) = template.find(QUESTION_PLACEHOLDER) {
        slots.push((pos, QUESTION_PLACEHOLDER, question));
    }
    slots.sort_by_key(|(pos, _, _)| *pos);

    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut cursor = 0;
    for (pos, placeholder, value) in slots {
        out.push_str(&template[cursor..pos]);
        out.push_str(value);
        cursor = pos + placeholder.len();
    }
    out.push_str(&template[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RagError;

    fn result(text: &str, rank: usize) -> SearchResult {
        SearchResult {
            chunk_id: rank - 1,
            text: text.to_string(),
            score: 1.0 - rank as f32 * 0.1,
            sequence_index: rank - 1,
            rank,
        }
    }

    #[test]
    fn test_context_preserves_rank_order() {
        let assembler = PromptAssembler::new();
        let results = vec![result("second passage", 2), result("first passage", 1)];

        let context = assembler.build_context(&results);
        let first = context.find("second passage").unwrap();
        let second = context.find("first passage").unwrap();
        assert!(first < second, "passages must stay in given order");
        assert!(context.contains(CONTEXT_SEPARATOR));
    }

    #[test]
    fn test_assemble_round_trip() {
        let mut templates = PromptTemplates::new();
        templates.register("bare", "{context}---{question}").unwrap();
        let assembler = PromptAssembler::with_templates(templates);

        let results = vec![result("Robber moves on 7.", 1), result("Roll two dice.", 2)];
        let prompt = assembler
            .assemble("bare", &results, "What happens on 7?")
            .unwrap();

        let expected_context = format!("Robber moves on 7.{}Roll two dice.", CONTEXT_SEPARATOR);
        assert_eq!(
            prompt,
            format!("{}---What happens on 7?", expected_context)
        );
        assert_eq!(prompt.matches("What happens on 7?").count(), 1);
        assert_eq!(prompt.matches(&expected_context).count(), 1);
    }

    #[test]
    fn test_assemble_default_template() {
        let assembler = PromptAssembler::new();
        let results = vec![result("You may trade with any player.", 1)];

        let prompt = assembler
            .assemble("default", &results, "How does trading work?")
            .unwrap();

        assert!(prompt.contains("You may trade with any player."));
        assert!(prompt.contains("How does trading work?"));
        assert!(!prompt.contains(CONTEXT_PLACEHOLDER));
        assert!(!prompt.contains(QUESTION_PLACEHOLDER));
    }

    #[test]
    fn test_assemble_unknown_template_fails() {
        let assembler = PromptAssembler::new();
        assert!(matches!(
            assembler.assemble("missing", &[], "q"),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut templates = PromptTemplates::new();
        templates.register("bare", "{context}---{question}").unwrap();
        let assembler = PromptAssembler::with_templates(templates);

        // Passage text that itself looks like a placeholder must come
        // through literally.
        let results = vec![result("see {question} in the rulebook", 1)];
        let prompt = assembler.assemble("bare", &results, "real question").unwrap();

        assert_eq!(prompt, "see {question} in the rulebook---real question");
    }

    #[test]
    fn test_empty_results_yield_empty_context() {
        let assembler = PromptAssembler::new();
        assert_eq!(assembler.build_context(&[]), "");
    }
}
