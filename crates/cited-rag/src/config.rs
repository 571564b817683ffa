//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default config file looked up when `CITED_RAG_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "cited-rag.toml";

/// Main RAG configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Backend provider (gemini or ollama)
    pub backend: BackendProvider,
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Answer generation configuration
    pub generation: GenerationConfig,
    /// Reranker configuration
    pub rerank: RerankConfig,
    /// Retrieval limits
    pub retrieval: RetrievalConfig,
    /// Vector store configuration
    pub vector_db: VectorDbConfig,
}

impl RagConfig {
    /// Load configuration from `CITED_RAG_CONFIG` (or `cited-rag.toml` when present),
    /// then apply secrets from the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CITED_RAG_CONFIG").ok();
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Overlay API keys and endpoints from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.embeddings.api_key = Some(key.clone());
            self.generation.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("COHERE_API_KEY") {
            self.rerank.api_key = Some(key);
        }
        if let Ok(url) =
            std::env::var("SUPABASE_URL").or_else(|_| std::env::var("NEXT_PUBLIC_SUPABASE_URL"))
        {
            self.vector_db.supabase_url = Some(url);
        }
        if let Ok(key) = std::env::var("SUPABASE_SERVICE_ROLE_KEY") {
            self.vector_db.supabase_key = Some(key);
        }
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            self.generation.ollama_base_url = url;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be positive".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".into()));
        }
        if self.retrieval.top_n > self.retrieval.top_k {
            return Err(Error::Config(format!(
                "retrieval.top_n ({}) must not exceed top_k ({})",
                self.retrieval.top_n, self.retrieval.top_k
            )));
        }
        if self.generation.models.is_empty() {
            return Err(Error::Config("generation.models must list at least one model".into()));
        }
        Ok(())
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Google Generative Language API for embeddings and generation
    #[default]
    Gemini,
    /// Local Ollama server for embeddings and generation
    Ollama,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// How far back from a window end to look for a sentence break
    pub boundary_window: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
            boundary_window: 100,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Texts embedded concurrently per batch during ingestion
    pub batch_size: usize,
    /// API key (Gemini backend)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            batch_size: 10,
            api_key: None,
        }
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Models tried in order until one succeeds
    pub models: Vec<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Output token cap per answer
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Characters of chunk content shown in a citation snippet
    pub snippet_chars: usize,
    /// Gemini API base URL
    pub api_base: String,
    /// Ollama base URL (Ollama backend)
    pub ollama_base_url: String,
    /// API key (Gemini backend)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gemini-2.5-flash".to_string(),
                "gemini-2.5-flash-lite".to_string(),
                "gemini-flash-latest".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemma-3-27b-it".to_string(),
            ],
            temperature: 0.3,
            max_output_tokens: 1024,
            timeout_secs: 120,
            snippet_chars: 200,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            api_key: None,
        }
    }
}

/// Reranker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Cohere rerank model
    pub model: String,
    /// Cohere API base URL
    pub api_base: String,
    /// API key; without one vector search order is kept
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            model: "rerank-english-v3.0".to_string(),
            api_base: "https://api.cohere.com/v1".to_string(),
            api_key: None,
        }
    }
}

/// Retrieval limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates fetched from vector search
    pub top_k: usize,
    /// Results kept after reranking
    pub top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 20, top_n: 5 }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Supabase project URL; without one an in-memory store is used
    pub supabase_url: Option<String>,
    /// Supabase service role key
    #[serde(skip_serializing)]
    pub supabase_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 150);
        assert_eq!(config.retrieval.top_k, 20);
        assert_eq!(config.retrieval.top_n, 5);
        assert_eq!(config.embeddings.batch_size, 10);
        assert_eq!(config.generation.models.first().map(String::as_str), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml(
            r#"
            backend = "ollama"

            [retrieval]
            top_k = 8

            [generation]
            models = ["llama3.2:3b", "phi3"]
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendProvider::Ollama);
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.top_n, 5);
        assert_eq!(config.generation.models, vec!["llama3.2:3b", "phi3"]);
        assert_eq!(config.generation.max_output_tokens, 1024);
        assert_eq!(config.chunking.chunk_size, 1000);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = RagConfig::default();
        config.retrieval.top_n = 30;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = 1000;
        assert!(config.validate().is_err());

        let mut config = RagConfig::default();
        config.generation.models.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(RagConfig::from_toml("retrieval = 3"), Err(Error::Config(_))));
    }
}
