//! Chunk types with source tracking for citations

use serde::{Deserialize, Serialize};

/// Positional and source metadata stored alongside each chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Source document identifier
    pub source: String,
    /// Document title
    pub title: String,
    /// Start offset (characters) in the normalized source text
    pub start_index: usize,
    /// End offset (characters, exclusive) in the normalized source text
    pub end_index: usize,
    /// Ordinal of the chunk within its document
    pub chunk_index: u32,
}

/// A contiguous slice of a source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Stable chunk ID, `{source}-{chunk_index}`
    pub id: String,
    /// Text content (trimmed)
    pub content: String,
    /// Source information for citations
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk. The ID is derived from the source and ordinal so
    /// re-ingesting the same source overwrites the same records.
    pub fn new(
        source: &str,
        title: &str,
        content: String,
        start_index: usize,
        end_index: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Self::make_id(source, chunk_index),
            content,
            metadata: ChunkMetadata {
                source: source.to_string(),
                title: title.to_string(),
                start_index,
                end_index,
                chunk_index,
            },
        }
    }

    /// Chunk ID for a source and ordinal
    pub fn make_id(source: &str, chunk_index: u32) -> String {
        format!("{}-{}", source, chunk_index)
    }
}
