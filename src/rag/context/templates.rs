//! Prompt template registry
//!
//! Named templates with `{context}` and `{question}` placeholders. The
//! registry is an explicit value handed to the prompt assembler, so tests
//! can supply isolated registries instead of relying on ambient globals.

use std::collections::HashMap;

use crate::error::{RagError, Result};

/// Placeholder substituted with the concatenated retrieved passages.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder substituted with the user's question.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Registry of named prompt templates.
///
/// Every template must contain each placeholder exactly once; that is
/// enforced at registration time, not when a prompt is rendered.
pub struct PromptTemplates {
    templates: HashMap<String, String>,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            "default".to_string(),
            concat!(
                "Answer the question based only on the following context:\n\n",
                "{context}\n\n",
                "---\n\n",
                "Answer the question based on the above context: {question}"
            )
            .to_string(),
        );

        templates.insert(
            "explanatory".to_string(),
            concat!(
                "You are explaining the rules of a board game to a new player. ",
                "Using only the rulebook passages below, answer the question and ",
                "briefly explain the reasoning behind the rule.\n\n",
                "Rulebook passages:\n{context}\n\n",
                "Question: {question}\n\n",
                "Explanation:"
            )
            .to_string(),
        );

        templates.insert(
            "step_by_step".to_string(),
            concat!(
                "Using only the rulebook passages below, answer the question as a ",
                "numbered list of steps a player should follow.\n\n",
                "Rulebook passages:\n{context}\n\n",
                "Question: {question}\n\n",
                "Steps:"
            )
            .to_string(),
        );

        Self { templates }
    }
}

impl PromptTemplates {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Look up a template by name.
    ///
    /// Unknown names are a configuration error; there is no silent fallback.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.templates
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| {
                RagError::Configuration(format!(
                    "unknown prompt template '{}'; available: {}",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    /// Register a template, validating its placeholders.
    ///
    /// The template must contain `{context}` and `{question}` exactly once
    /// each.
    pub fn register(&mut self, name: &str, template: &str) -> Result<()> {
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            let count = template.matches(placeholder).count();
            if count != 1 {
                return Err(RagError::Configuration(format!(
                    "template '{}' must contain {} exactly once (found {})",
                    name, placeholder, count
                )));
            }
        }
        self.templates.insert(name.to_string(), template.to_string());
        Ok(())
    }

    /// Check whether a template exists.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
