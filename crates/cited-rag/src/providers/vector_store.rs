//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chunk;

/// A chunk paired with its embedding, ready to upsert
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// The chunk; its ID is the upsert key
    pub chunk: Chunk,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// Search result from vector store
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedCandidate {
    /// The matched chunk
    pub chunk: Chunk,
    /// Similarity score (higher is more similar)
    pub similarity: f32,
}

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `SupabaseVectorStore`: pgvector behind PostgREST
/// - `InMemoryVectorStore`: process-local cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace records by chunk ID
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Nearest chunks to `query_embedding`, most similar first
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedCandidate>>;

    /// Get total number of vectors stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
