//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata};
pub use query::{IngestRequest, QueryRequest};
pub use response::{Citation, IngestResponse, QueryMetrics, QueryResponse, SourceRef};
