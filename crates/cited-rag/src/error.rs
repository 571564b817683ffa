//! Error types for the RAG pipeline

use thiserror::Error;

/// Error type string for input validation failures
pub const VALIDATION_ERROR: &str = "validation_error";

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a generation backend.
///
/// The first three variants are the retryable class: the generator moves on
/// to the next model in its fallback list. Everything else is fatal.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    /// Provider throttled the request (HTTP 429)
    #[error("Rate limited by provider ({model}): {message}")]
    RateLimited { model: String, message: String },

    /// Quota for the model or key is exhausted
    #[error("Quota exhausted for {model}: {message}")]
    QuotaExceeded { model: String, message: String },

    /// Model id is unknown or not supported for generation
    #[error("Model not found or unsupported: {model}")]
    ModelUnavailable { model: String },

    /// Credentials rejected
    #[error("Authentication failed for {provider}")]
    AuthFailed { provider: String },

    /// Transport failure or a non-success status outside the retryable class
    #[error("Generation request failed: {message}")]
    Request { message: String },

    /// Response body did not have the expected shape
    #[error("Failed to parse generation response: {message}")]
    ResponseParse { message: String },

    /// Model answered with no text
    #[error("Model {model} returned an empty response")]
    EmptyResponse { model: String },
}

impl LlmError {
    /// Whether the fallback loop should try the next model.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::QuotaExceeded { .. }
                | LlmError::ModelUnavailable { .. }
        )
    }

    /// Map a non-success HTTP status and body to the taxonomy.
    pub fn from_status(model: &str, status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        match status {
            429 if lower.contains("quota") => LlmError::QuotaExceeded {
                model: model.to_string(),
                message: body.to_string(),
            },
            429 => LlmError::RateLimited {
                model: model.to_string(),
                message: body.to_string(),
            },
            404 => LlmError::ModelUnavailable {
                model: model.to_string(),
            },
            401 | 403 if lower.contains("quota") => LlmError::QuotaExceeded {
                model: model.to_string(),
                message: body.to_string(),
            },
            401 | 403 => LlmError::AuthFailed {
                provider: model.to_string(),
            },
            _ if lower.contains("quota") => LlmError::QuotaExceeded {
                model: model.to_string(),
                message: body.to_string(),
            },
            400 if lower.contains("not supported") || lower.contains("not found") => {
                LlmError::ModelUnavailable {
                    model: model.to_string(),
                }
            }
            _ => LlmError::Request {
                message: format!("HTTP {} - {}", status, body),
            },
        }
    }
}

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty required input, rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorDb(String),

    /// Reranker error
    #[error("Rerank failed: {0}")]
    Rerank(String),

    /// Generation backend error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Every model in the fallback list failed with a retryable error
    #[error("All {attempts} models failed. Last error: {last}")]
    AllModelsFailed { attempts: usize, last: LlmError },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a rerank error
    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank(message.into())
    }

    /// True for input errors the caller can fix
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Stable machine-readable error type, e.g. `validation_error`
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Validation(_) => VALIDATION_ERROR,
            Error::Config(_) => "config_error",
            Error::Embedding(_) => "embedding_error",
            Error::VectorDb(_) => "vector_db_error",
            Error::Rerank(_) => "rerank_error",
            Error::Llm(_) => "llm_error",
            Error::AllModelsFailed { .. } => "all_models_failed",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }
}
