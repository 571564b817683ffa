//! Answer generation with LLM fallback and citation handling

pub mod citation;
pub mod generator;
pub mod prompt;

pub use citation::{extract_citation_indices, resolve_citations, truncate_snippet};
pub use generator::{detect_no_answer, estimate_tokens, GenerationOutcome, Generator, NO_CONTEXT_ANSWER};
pub use prompt::{Prompt, PromptBuilder};
