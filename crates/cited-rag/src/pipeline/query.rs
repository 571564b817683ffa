//! Query path

use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::{apply_rerank, RankedResult};
use crate::types::{QueryMetrics, QueryRequest, QueryResponse, SourceRef};

use super::{elapsed_ms, RagPipeline};

impl RagPipeline {
    /// Answer a question with citations.
    ///
    /// Never fails outright: any stage error becomes a failure response
    /// carrying the metrics gathered up to that point.
    pub async fn query(&self, request: QueryRequest) -> QueryResponse {
        let start = Instant::now();
        let mut metrics = QueryMetrics::default();

        match self.run_query(&request, start, &mut metrics).await {
            Ok(response) => response,
            Err(e) => {
                metrics.total_time_ms = elapsed_ms(start);
                if e.is_validation() {
                    tracing::warn!("Rejected query: {}", e);
                } else {
                    tracing::error!("Query failed after {}ms: {}", metrics.total_time_ms, e);
                }
                QueryResponse::failure(&e, metrics)
            }
        }
    }

    async fn run_query(
        &self,
        request: &QueryRequest,
        start: Instant,
        metrics: &mut QueryMetrics,
    ) -> Result<QueryResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(Error::validation("Query is required"));
        }
        let (top_k, top_n) = self.limits(request.top_k, request.top_n);

        tracing::info!("Query: \"{}\" (top_k={}, top_n={})", query, top_k, top_n);

        // Embed + search
        let retrieve_start = Instant::now();
        let embedding = self.embedder.embed(query).await?;
        metrics.embed_time_ms = elapsed_ms(retrieve_start);

        let candidates = self.vector_store.search(&embedding, top_k).await?;
        metrics.retrieve_time_ms = elapsed_ms(retrieve_start);
        metrics.retrieved_count = candidates.len();
        tracing::info!("Retrieved {} candidates in {}ms", candidates.len(), metrics.retrieve_time_ms);

        // Rerank
        let rerank_start = Instant::now();
        let ranked = self.rerank(query, &candidates, top_n).await?;
        metrics.rerank_time_ms = elapsed_ms(rerank_start);
        metrics.reranked_count = ranked.len();
        tracing::info!("Reranked to {} results in {}ms", ranked.len(), metrics.rerank_time_ms);

        // Generate
        let generate_start = Instant::now();
        let outcome = self.generator.generate(query, &ranked).await?;
        metrics.generate_time_ms = elapsed_ms(generate_start);
        metrics.tokens_used = outcome.tokens_used;
        metrics.total_time_ms = elapsed_ms(start);

        tracing::info!(
            "Query completed in {}ms, {} citations",
            metrics.total_time_ms,
            outcome.citations.len()
        );

        let sources = ranked
            .iter()
            .enumerate()
            .map(|(i, r)| SourceRef::from_ranked(i + 1, r))
            .collect();

        Ok(QueryResponse {
            success: true,
            answer: outcome.answer,
            citations: outcome.citations,
            sources,
            metrics: metrics.clone(),
            no_answer: outcome.no_answer,
            model_used: outcome.model_used,
            error: None,
            error_type: None,
        })
    }

    async fn rerank(
        &self,
        query: &str,
        candidates: &[crate::providers::RetrievedCandidate],
        top_n: usize,
    ) -> Result<Vec<RankedResult>> {
        if candidates.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = candidates.iter().map(|c| c.chunk.content.clone()).collect();
        let hits = self.reranker.rerank(query, &documents, top_n).await?;
        apply_rerank(candidates, hits, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::generation::NO_CONTEXT_ANSWER;
    use crate::pipeline::tests::pipeline_with;
    use crate::providers::RerankHit;
    use crate::testing::{FixedReranker, KeywordEmbedder, ScriptedLlm};
    use crate::types::IngestRequest;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_two_document_corpus_resolves_both_citations() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let reranker = Arc::new(FixedReranker::in_order());
        let llm = Arc::new(
            ScriptedLlm::new().reply("primary", "Vacation accrues monthly [1] and refunds take five days [2]."),
        );
        let pipeline = pipeline_with(embedder, reranker, llm.clone());

        pipeline
            .ingest(
                IngestRequest::new("Vacation accrues monthly for all staff.")
                    .with_source("handbook")
                    .with_title("Employee Handbook"),
            )
            .await;
        pipeline
            .ingest(
                IngestRequest::new("Refunds take five days to process.")
                    .with_source("faq")
                    .with_title("Billing FAQ"),
            )
            .await;

        let response = pipeline
            .query(QueryRequest::new("How does vacation accrue?").with_top_n(2))
            .await;

        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.metrics.retrieved_count, 2);
        assert_eq!(response.metrics.reranked_count, 2);
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.model_used.as_deref(), Some("primary"));

        let indices: Vec<usize> = response.citations.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2]);
        for citation in &response.citations {
            let source = &response.sources[citation.index - 1];
            assert_eq!(citation.source, source.source);
            assert_eq!(citation.title, source.title);
        }
        // Vacation question: the handbook chunk ranks first
        assert_eq!(response.citations[0].title, "Employee Handbook");
        assert_eq!(response.citations[1].title, "Billing FAQ");
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_any_stage() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let llm = Arc::new(ScriptedLlm::new());
        let pipeline = pipeline_with(embedder.clone(), Arc::new(FixedReranker::in_order()), llm.clone());

        let response = pipeline.query(QueryRequest::new("   ")).await;
        assert!(!response.success);
        assert!(response.no_answer);
        assert!(response.is_validation_failure());
        assert_eq!(embedder.embed_calls(), 0);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_gives_no_context_answer() {
        let llm = Arc::new(ScriptedLlm::new().reply("primary", "unused"));
        let pipeline = pipeline_with(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(FixedReranker::in_order()),
            llm.clone(),
        );

        let response = pipeline.query(QueryRequest::new("Anything?")).await;
        assert!(response.success);
        assert!(response.no_answer);
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert_eq!(response.metrics.tokens_used, 0);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_failure_response() {
        let llm = Arc::new(
            ScriptedLlm::new()
                .fail("primary", LlmError::QuotaExceeded { model: "primary".into(), message: "quota".into() })
                .fail("backup", LlmError::QuotaExceeded { model: "backup".into(), message: "quota".into() }),
        );
        let pipeline = pipeline_with(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(FixedReranker::in_order()),
            llm.clone(),
        );
        pipeline
            .ingest(IngestRequest::new("Some stored text.").with_source("doc"))
            .await;

        let response = pipeline.query(QueryRequest::new("stored text?")).await;
        assert!(!response.success);
        assert!(response.no_answer);
        assert!(response.answer.is_empty());
        assert_eq!(response.error_type.as_deref(), Some("all_models_failed"));
        assert!(response.error.unwrap().contains("All 2 models failed"));
        assert_eq!(response.metrics.retrieved_count, 1);
        assert_eq!(llm.calls(), vec!["primary", "backup"]);
    }

    #[tokio::test]
    async fn test_reranker_order_sets_citation_index() {
        let reranker = Arc::new(FixedReranker::with_hits(vec![RerankHit {
            index: 1,
            relevance_score: 0.99,
        }]));
        let llm = Arc::new(ScriptedLlm::new().reply("primary", "See [1]. Also [2]."));
        let pipeline = pipeline_with(Arc::new(KeywordEmbedder::new()), reranker.clone(), llm);
        pipeline
            .ingest(IngestRequest::new("apples are red").with_source("a").with_title("A"))
            .await;
        pipeline
            .ingest(IngestRequest::new("bananas are yellow").with_source("b").with_title("B"))
            .await;

        let response = pipeline.query(QueryRequest::new("apples")).await;
        assert!(response.success);
        assert_eq!(reranker.seen().len(), 2);
        assert_eq!(response.sources.len(), 1);
        // [2] is out of range for a single ranked result
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].index, 1);
        assert_eq!(response.citations[0].source, response.sources[0].source);
        assert_eq!(response.sources[0].relevance_score, 0.99);
    }

    #[tokio::test]
    async fn test_embedding_failure_stops_later_stages() {
        let reranker = Arc::new(FixedReranker::in_order());
        let llm = Arc::new(ScriptedLlm::new().reply("primary", "unused [1]"));
        let pipeline = pipeline_with(
            Arc::new(KeywordEmbedder::failing_on("broken")),
            reranker.clone(),
            llm.clone(),
        );
        pipeline
            .ingest(IngestRequest::new("Some stored text.").with_source("doc"))
            .await;

        let response = pipeline.query(QueryRequest::new("broken question?")).await;
        assert!(!response.success);
        assert!(response.no_answer);
        assert!(!response.is_validation_failure());
        assert_eq!(response.error_type.as_deref(), Some("embedding_error"));
        assert_eq!(response.metrics.retrieved_count, 0);
        assert_eq!(response.metrics.reranked_count, 0);
        assert!(reranker.seen().is_empty());
        assert!(llm.calls().is_empty());

        let body = serde_json::to_value(&response).unwrap();
        assert!(body["metrics"]["total_time_ms"].is_u64());
    }
}
