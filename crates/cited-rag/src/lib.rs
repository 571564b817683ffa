//! cited-rag: retrieval-augmented question answering with validated citations
//!
//! Documents are chunked, embedded and upserted into a vector store. Questions
//! run embed → search → rerank → generate, with generation falling back across
//! an ordered model list and every `[n]` marker in the answer checked against
//! the ranked context before it becomes a citation.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RagConfig;
pub use error::{Error, LlmError, Result};
pub use pipeline::RagPipeline;
pub use types::{
    document::{Chunk, ChunkMetadata},
    query::{IngestRequest, QueryRequest},
    response::{Citation, IngestResponse, QueryMetrics, QueryResponse, SourceRef},
};
