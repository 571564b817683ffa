//! Document ingestion: sentence-aware chunking

mod chunker;

pub use chunker::{chunk_text, ChunkingOptions, TextChunker};
