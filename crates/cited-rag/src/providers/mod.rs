//! Provider abstractions for embeddings, LLM, reranking, and vector storage
//!
//! The pipeline only sees the traits. [`Providers::from_config`] wires the
//! concrete clients for the configured backend.

pub mod cohere;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod reranker;
pub mod supabase;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{BackendProvider, RagConfig};
use crate::error::Result;

pub use cohere::CohereReranker;
pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use memory::InMemoryVectorStore;
pub use ollama::OllamaClient;
pub use reranker::{apply_rerank, PassthroughReranker, RankedResult, RerankHit, RerankProvider};
pub use supabase::SupabaseVectorStore;
pub use vector_store::{RetrievedCandidate, VectorRecord, VectorStoreProvider};

/// The four collaborators a pipeline runs against
#[derive(Clone)]
pub struct Providers {
    /// Embedding provider (Gemini or Ollama)
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider (Gemini or Ollama)
    pub llm: Arc<dyn LlmProvider>,
    /// Vector store (Supabase or in-memory)
    pub vector_store: Arc<dyn VectorStoreProvider>,
    /// Reranker (Cohere or passthrough)
    pub reranker: Arc<dyn RerankProvider>,
}

impl Providers {
    /// Build providers for the configured backend.
    ///
    /// Cohere is used when a key is present, otherwise vector order is kept.
    /// Supabase is used when URL and key are present, otherwise chunks stay
    /// in process memory.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let (embedder, llm): (Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>) =
            match config.backend {
                BackendProvider::Gemini => {
                    let client = Arc::new(GeminiClient::new(&config.embeddings, &config.generation)?);
                    (client.clone(), client)
                }
                BackendProvider::Ollama => {
                    let client = Arc::new(OllamaClient::new(&config.embeddings, &config.generation)?);
                    (client.clone(), client)
                }
            };

        let reranker: Arc<dyn RerankProvider> = if config.rerank.api_key.is_some() {
            Arc::new(CohereReranker::new(&config.rerank)?)
        } else {
            tracing::warn!("COHERE_API_KEY not set, keeping vector search order");
            Arc::new(PassthroughReranker)
        };

        let vector_store: Arc<dyn VectorStoreProvider> =
            if config.vector_db.supabase_url.is_some() && config.vector_db.supabase_key.is_some() {
                Arc::new(SupabaseVectorStore::new(&config.vector_db)?)
            } else {
                tracing::warn!("Supabase not configured, using in-memory vector store");
                Arc::new(InMemoryVectorStore::new())
            };

        tracing::info!(
            "Providers initialized (embedder: {}, llm: {}, vector store: {}, reranker: {})",
            embedder.name(),
            llm.name(),
            vector_store.name(),
            reranker.name()
        );

        Ok(Self {
            embedder,
            llm,
            vector_store,
            reranker,
        })
    }
}
