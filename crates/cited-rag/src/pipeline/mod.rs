//! Query and ingestion orchestration
//!
//! Query: embed → search → rerank → generate, strictly in sequence.
//! Ingest: chunk → embed in batches → upsert.

mod ingest;
mod query;

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::Generator;
use crate::ingestion::TextChunker;
use crate::providers::{EmbeddingProvider, Providers, RerankProvider, VectorStoreProvider};

/// The RAG pipeline. Holds no per-query state, so one instance serves
/// concurrent calls.
pub struct RagPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    reranker: Arc<dyn RerankProvider>,
    generator: Generator,
    top_k: usize,
    top_n: usize,
    batch_size: usize,
}

impl RagPipeline {
    /// Build a pipeline with providers chosen from config
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let providers = Providers::from_config(config)?;
        Ok(Self::new(config, providers))
    }

    /// Build a pipeline from config and explicit providers
    pub fn new(config: &RagConfig, providers: Providers) -> Self {
        Self {
            chunker: TextChunker::from_config(&config.chunking),
            embedder: providers.embedder,
            vector_store: providers.vector_store,
            reranker: providers.reranker,
            generator: Generator::from_config(providers.llm, &config.generation),
            top_k: config.retrieval.top_k,
            top_n: config.retrieval.top_n,
            batch_size: config.embeddings.batch_size.max(1),
        }
    }

    /// Vector store backing this pipeline
    pub fn vector_store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.vector_store
    }

    /// Effective (top_k, top_n) for a request. A missing or zero override
    /// means the configured value; top_n never exceeds top_k.
    fn limits(&self, top_k: Option<usize>, top_n: Option<usize>) -> (usize, usize) {
        let top_k = top_k.filter(|&k| k > 0).unwrap_or(self.top_k).max(1);
        let top_n = top_n.filter(|&n| n > 0).unwrap_or(self.top_n).min(top_k);
        (top_k, top_n)
    }
}

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::InMemoryVectorStore;
    use crate::testing::{FixedReranker, KeywordEmbedder, ScriptedLlm};

    pub(super) fn pipeline_with(
        embedder: Arc<KeywordEmbedder>,
        reranker: Arc<FixedReranker>,
        llm: Arc<ScriptedLlm>,
    ) -> RagPipeline {
        let mut config = RagConfig::default();
        config.generation.models = vec!["primary".into(), "backup".into()];
        RagPipeline::new(
            &config,
            Providers {
                embedder,
                llm,
                vector_store: Arc::new(InMemoryVectorStore::new()),
                reranker,
            },
        )
    }

    #[test]
    fn test_limits_clamp_top_n() {
        let pipeline = pipeline_with(
            Arc::new(KeywordEmbedder::new()),
            Arc::new(FixedReranker::in_order()),
            Arc::new(ScriptedLlm::new()),
        );
        assert_eq!(pipeline.limits(None, None), (20, 5));
        assert_eq!(pipeline.limits(Some(3), None), (3, 3));
        assert_eq!(pipeline.limits(Some(10), Some(50)), (10, 10));
        assert_eq!(pipeline.limits(Some(0), Some(2)), (20, 2));
        assert_eq!(pipeline.limits(Some(3), Some(0)), (3, 3));
        assert_eq!(pipeline.limits(Some(0), Some(0)), (20, 5));
    }
}
