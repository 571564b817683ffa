//! Prompt templates for cited answer generation

use crate::providers::RankedResult;

/// Fixed instruction block that opens every prompt
pub const INSTRUCTIONS: &str = "You are a helpful assistant that answers questions based on the provided context.
You must:
1. Only use information from the provided context to answer.
2. Include inline citations like [1], [2], etc. that reference the context snippets.
3. If the context doesn't contain enough information to answer the question, say so clearly.
4. Be concise but comprehensive.";

/// A built prompt. The system part (instructions plus context) is kept
/// separately because token estimation counts it on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Instructions followed by the numbered context
    pub system: String,
    /// The complete text sent to the model
    pub full: String,
}

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Number ranked results in rank order as `[i] content`
    pub fn build_context(results: &[RankedResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| format!("[{}] {}", i + 1, result.content()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the full prompt for `query` over `results`
    pub fn build(query: &str, results: &[RankedResult]) -> Prompt {
        let system = format!("{}\n\nContext:\n{}", INSTRUCTIONS, Self::build_context(results));
        let full = format!("{}\n\nQuestion: {}", system, query);
        Prompt { system, full }
    }
}
