//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::LlmError;

/// A generation backend that can serve several models.
///
/// Failures come back already classified so the generator can decide
/// between falling back to the next model and aborting.
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API
/// - `OllamaClient`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for `prompt` with the given model
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
