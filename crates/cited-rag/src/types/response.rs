//! Response types for queries and ingestion

use serde::{Deserialize, Serialize};

use crate::error::{Error, VALIDATION_ERROR};
use crate::providers::reranker::RankedResult;

/// A source passage the answer actually referenced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// 1-based rank position used as the `[n]` marker
    pub index: usize,
    /// Source document identifier
    pub source: String,
    /// Document title
    pub title: String,
    /// Leading excerpt of the chunk content
    pub snippet: String,
}

/// A context passage handed to the generator, cited or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// 1-based rank position
    pub index: usize,
    /// Chunk ID
    pub chunk_id: String,
    /// Source document identifier
    pub source: String,
    /// Document title
    pub title: String,
    /// Vector similarity from search
    pub similarity: f32,
    /// Relevance score from the reranker
    pub relevance_score: f32,
}

impl SourceRef {
    /// Build from a ranked result at a 1-based position
    pub fn from_ranked(index: usize, ranked: &RankedResult) -> Self {
        let chunk = &ranked.candidate.chunk;
        Self {
            index,
            chunk_id: chunk.id.clone(),
            source: chunk.metadata.source.clone(),
            title: chunk.metadata.title.clone(),
            similarity: ranked.candidate.similarity,
            relevance_score: ranked.relevance_score,
        }
    }
}

/// Per-stage counts and timings for a query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryMetrics {
    /// Candidates returned by vector search
    pub retrieved_count: usize,
    /// Results kept after reranking
    pub reranked_count: usize,
    /// Estimated prompt + answer tokens
    pub tokens_used: usize,
    /// Query embedding time
    pub embed_time_ms: u64,
    /// Embedding plus vector search time
    pub retrieve_time_ms: u64,
    /// Rerank time
    pub rerank_time_ms: u64,
    /// Generation time, including failed fallback attempts
    pub generate_time_ms: u64,
    /// Wall time for the whole call (up to the failure point on error)
    pub total_time_ms: u64,
    /// Placeholder; both default backends are free tier
    pub estimated_cost: f64,
}

/// Response from a RAG query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Whether the pipeline completed
    pub success: bool,
    /// Generated answer (empty on failure)
    pub answer: String,
    /// Citations referenced by the answer, ascending by index
    pub citations: Vec<Citation>,
    /// Every passage given to the generator, in rank order
    pub sources: Vec<SourceRef>,
    /// Stage metrics
    pub metrics: QueryMetrics,
    /// Advisory flag: the answer says the context was insufficient
    pub no_answer: bool,
    /// Model that produced the answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure class, e.g. `validation_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl QueryResponse {
    /// Failure result carrying the elapsed time up to the failing stage
    pub fn failure(error: &Error, metrics: QueryMetrics) -> Self {
        Self {
            success: false,
            answer: String::new(),
            citations: Vec::new(),
            sources: Vec::new(),
            metrics,
            no_answer: true,
            model_used: None,
            error: Some(error.to_string()),
            error_type: Some(error.error_type().to_string()),
        }
    }

    /// Whether the failure was bad input rather than a backend fault
    pub fn is_validation_failure(&self) -> bool {
        self.error_type.as_deref() == Some(VALIDATION_ERROR)
    }
}

/// Response from document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Whether ingestion was successful
    pub success: bool,
    /// Source identifier the chunks were stored under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Chunks created and stored
    pub chunks_created: usize,
    /// Processing time in milliseconds
    pub time_ms: u64,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure class, e.g. `validation_error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl IngestResponse {
    /// Successful ingestion
    pub fn completed(source: String, chunks_created: usize, time_ms: u64) -> Self {
        Self {
            success: true,
            source: Some(source),
            chunks_created,
            time_ms,
            error: None,
            error_type: None,
        }
    }

    /// Failed ingestion
    pub fn failure(error: &Error, time_ms: u64) -> Self {
        Self {
            success: false,
            source: None,
            chunks_created: 0,
            time_ms,
            error: Some(error.to_string()),
            error_type: Some(error.error_type().to_string()),
        }
    }

    /// Whether the failure was bad input rather than a backend fault
    pub fn is_validation_failure(&self) -> bool {
        self.error_type.as_deref() == Some(VALIDATION_ERROR)
    }
}
