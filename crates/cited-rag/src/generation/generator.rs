//! Cited answer generation with ordered model fallback

use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::error::{Error, LlmError, Result};
use crate::providers::{LlmProvider, RankedResult};
use crate::types::Citation;

use super::citation::resolve_citations;
use super::prompt::PromptBuilder;

/// Answer returned when retrieval produced no context
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

/// Lowercase phrases that mark an answer as a refusal
const NO_ANSWER_PHRASES: [&str; 3] = ["don't have enough information", "cannot answer", "no information"];

/// Result of one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Model output, unmodified
    pub answer: String,
    /// Citations the answer actually uses, ascending by index
    pub citations: Vec<Citation>,
    /// Rough token estimate for prompt and answer
    pub tokens_used: usize,
    /// Model that produced the answer; `None` when no call was made
    pub model_used: Option<String>,
    /// Advisory: the answer says the context was insufficient
    pub no_answer: bool,
}

impl GenerationOutcome {
    fn no_context() -> Self {
        Self {
            answer: NO_CONTEXT_ANSWER.to_string(),
            citations: Vec::new(),
            tokens_used: 0,
            model_used: None,
            no_answer: true,
        }
    }
}

/// Generates grounded answers, trying each configured model in order
pub struct Generator {
    llm: Arc<dyn LlmProvider>,
    models: Vec<String>,
    snippet_chars: usize,
}

impl Generator {
    /// Create a generator over an ordered model list
    pub fn new(llm: Arc<dyn LlmProvider>, models: Vec<String>) -> Self {
        Self {
            llm,
            models,
            snippet_chars: 200,
        }
    }

    /// Create from generation config
    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &GenerationConfig) -> Self {
        Self::new(llm, config.models.clone()).with_snippet_chars(config.snippet_chars)
    }

    /// Override the citation snippet length
    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    /// Answer `query` from `ranked` context.
    ///
    /// Empty context short-circuits without a backend call.
    pub async fn generate(&self, query: &str, ranked: &[RankedResult]) -> Result<GenerationOutcome> {
        if ranked.is_empty() {
            return Ok(GenerationOutcome::no_context());
        }

        let prompt = PromptBuilder::build(query, ranked);
        let (model_used, answer) = self.generate_with_fallback(&prompt.full).await?;

        let citations = resolve_citations(&answer, ranked, self.snippet_chars);
        let tokens_used = estimate_tokens(&[&prompt.system, query, &answer]);
        let no_answer = detect_no_answer(&answer);

        tracing::info!(
            "Generated answer with {} ({} citations, ~{} tokens)",
            model_used,
            citations.len(),
            tokens_used
        );

        Ok(GenerationOutcome {
            answer,
            citations,
            tokens_used,
            model_used: Some(model_used),
            no_answer,
        })
    }

    /// First success wins; a fatal error aborts; retryable errors move on.
    async fn generate_with_fallback(&self, prompt: &str) -> Result<(String, String)> {
        let mut last_error: Option<LlmError> = None;

        for model in &self.models {
            tracing::debug!("Trying model: {}", model);
            match self.llm.generate(model, prompt).await {
                Ok(text) => return Ok((model.clone(), text)),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("Model {} failed, falling back: {}", model, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::warn!("Model {} failed with a non-retryable error: {}", model, e);
                    return Err(Error::Llm(e));
                }
            }
        }

        match last_error {
            Some(last) => Err(Error::AllModelsFailed {
                attempts: self.models.len(),
                last,
            }),
            None => Err(Error::Config("No generation models configured".to_string())),
        }
    }
}

/// Whether the answer contains one of the refusal phrases (case-insensitive)
pub fn detect_no_answer(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    NO_ANSWER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Four characters per token, rounded up
pub fn estimate_tokens(parts: &[&str]) -> usize {
    let chars: usize = parts.iter().map(|p| p.chars().count()).sum();
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::prompt::INSTRUCTIONS;
    use crate::testing::{ranked, ScriptedLlm};

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rate_limited(model: &str) -> LlmError {
        LlmError::RateLimited {
            model: model.into(),
            message: "429".into(),
        }
    }

    #[tokio::test]
    async fn test_empty_context_makes_no_call() {
        let llm = Arc::new(ScriptedLlm::new());
        let generator = Generator::new(llm.clone(), models(&["a"]));

        let outcome = generator.generate("anything?", &[]).await.unwrap();
        assert!(outcome.no_answer);
        assert!(outcome.citations.is_empty());
        assert_eq!(outcome.tokens_used, 0);
        assert_eq!(outcome.model_used, None);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_until_success() {
        let llm = Arc::new(
            ScriptedLlm::new()
                .fail("a", rate_limited("a"))
                .fail("b", LlmError::ModelUnavailable { model: "b".into() })
                .reply("c", "Paris is the capital [1]."),
        );
        let generator = Generator::new(llm.clone(), models(&["a", "b", "c", "d"]));

        let outcome = generator
            .generate("Capital of France?", &[ranked("geo", "Geography", "Paris is the capital of France.")])
            .await
            .unwrap();

        assert_eq!(outcome.model_used.as_deref(), Some("c"));
        assert_eq!(llm.calls(), vec!["a", "b", "c"]);
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].title, "Geography");
        assert!(!outcome.no_answer);
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_fallback() {
        let llm = Arc::new(
            ScriptedLlm::new()
                .fail("a", LlmError::AuthFailed { provider: "a".into() })
                .reply("b", "unused"),
        );
        let generator = Generator::new(llm.clone(), models(&["a", "b"]));

        let err = generator
            .generate("q", &[ranked("s", "T", "content")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(LlmError::AuthFailed { .. })));
        assert_eq!(llm.calls(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_all_models_exhausted_reports_last_error() {
        let llm = Arc::new(
            ScriptedLlm::new()
                .fail("a", rate_limited("a"))
                .fail("b", rate_limited("b")),
        );
        let generator = Generator::new(llm.clone(), models(&["a", "b"]));

        let err = generator
            .generate("q", &[ranked("s", "T", "content")])
            .await
            .unwrap_err();
        match err {
            Error::AllModelsFailed { attempts, last } => {
                assert_eq!(attempts, 2);
                assert_eq!(last, rate_limited("b"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(llm.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_token_estimate_and_no_answer() {
        let answer = "I don't have enough information to answer that.";
        let llm = Arc::new(ScriptedLlm::new().reply("a", answer));
        let generator = Generator::new(llm, models(&["a"]));
        let context = [ranked("s", "T", "Unrelated text.")];

        let outcome = generator.generate("Why?", &context).await.unwrap();
        assert!(outcome.no_answer);
        assert!(outcome.citations.is_empty());

        let system = format!("{}\n\nContext:\n[1] Unrelated text.", INSTRUCTIONS);
        let expected = (system.len() + "Why?".len() + answer.len()).div_ceil(4);
        assert_eq!(outcome.tokens_used, expected);
    }

    #[test]
    fn test_detect_no_answer() {
        assert!(detect_no_answer("Sorry, I CANNOT ANSWER this."));
        assert!(detect_no_answer("There is no information about it."));
        assert!(!detect_no_answer("The answer is 42 [1]."));
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(&["abcd", "e"]), 2);
        assert_eq!(estimate_tokens(&[""]), 0);
    }
}
