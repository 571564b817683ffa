//! Reranker trait and the ranked result type handed to generation

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::vector_store::RetrievedCandidate;

/// One reranked entry, pointing back into the submitted document list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankHit {
    /// Position in the documents passed to `rerank`
    pub index: usize,
    /// Relevance score, higher is better
    pub relevance_score: f32,
}

/// A retrieved candidate with its reranker score. Position in the ranked
/// list (1-based) is the citation index.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// Candidate from vector search
    pub candidate: RetrievedCandidate,
    /// Relevance score from the reranker
    pub relevance_score: f32,
}

impl RankedResult {
    /// Chunk content
    pub fn content(&self) -> &str {
        &self.candidate.chunk.content
    }
}

/// Trait for query-aware reranking
///
/// Implementations:
/// - `CohereReranker`: Cohere rerank API
/// - `PassthroughReranker`: keeps vector search order
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Score `documents` against `query`; at most `top_n` hits, best first
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Reranker that trusts vector similarity order
#[derive(Debug, Clone, Default)]
pub struct PassthroughReranker;

#[async_trait]
impl RerankProvider for PassthroughReranker {
    async fn rerank(&self, _query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>> {
        let total = documents.len().max(1) as f32;
        Ok((0..documents.len().min(top_n))
            .map(|index| RerankHit {
                index,
                relevance_score: 1.0 - index as f32 / total,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Join reranker hits back to their candidates.
///
/// Hits are ordered by descending score and truncated to `top_n`; an index
/// outside the candidate list is a reranker fault.
pub fn apply_rerank(
    candidates: &[RetrievedCandidate],
    mut hits: Vec<RerankHit>,
    top_n: usize,
) -> Result<Vec<RankedResult>> {
    hits.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    hits.truncate(top_n);

    hits.into_iter()
        .map(|hit| {
            let candidate = candidates.get(hit.index).ok_or_else(|| {
                Error::rerank(format!(
                    "Reranker returned index {} for {} documents",
                    hit.index,
                    candidates.len()
                ))
            })?;
            Ok(RankedResult {
                candidate: candidate.clone(),
                relevance_score: hit.relevance_score,
            })
        })
        .collect()
}
