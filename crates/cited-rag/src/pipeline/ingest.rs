//! Ingestion path

use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::ChunkingOptions;
use crate::providers::VectorRecord;
use crate::types::{Chunk, IngestRequest, IngestResponse};

use super::{elapsed_ms, RagPipeline};

/// Title used when the caller gives none
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Source id used when the caller gives none
fn default_source() -> String {
    format!("doc-{}", chrono::Utc::now().timestamp_millis())
}

impl RagPipeline {
    /// Chunk, embed, and store a document with the configured chunking
    pub async fn ingest(&self, request: IngestRequest) -> IngestResponse {
        self.ingest_with_options(request, ChunkingOptions::default()).await
    }

    /// Chunk, embed, and store a document with per-call chunking overrides.
    ///
    /// Any failure (including one member of an embedding batch) fails the
    /// whole call and nothing from this document is stored.
    pub async fn ingest_with_options(&self, request: IngestRequest, options: ChunkingOptions) -> IngestResponse {
        let start = Instant::now();

        match self.run_ingest(request, options).await {
            Ok((source, count)) => {
                let time_ms = elapsed_ms(start);
                tracing::info!("Ingested {} as {} chunks in {}ms", source, count, time_ms);
                IngestResponse::completed(source, count, time_ms)
            }
            Err(e) => {
                let time_ms = elapsed_ms(start);
                if e.is_validation() {
                    tracing::warn!("Rejected ingestion: {}", e);
                } else {
                    tracing::error!("Ingestion failed after {}ms: {}", time_ms, e);
                }
                IngestResponse::failure(&e, time_ms)
            }
        }
    }

    async fn run_ingest(&self, request: IngestRequest, options: ChunkingOptions) -> Result<(String, usize)> {
        if request.text.trim().is_empty() {
            return Err(Error::validation("Text is required"));
        }

        let source = request
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(default_source);
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let chunks = self.chunker.with_options(options).chunk(&request.text, &source, &title);
        tracing::info!("Chunked {} into {} chunks", source, chunks.len());

        if chunks.is_empty() {
            return Ok((source, 0));
        }

        self.embed_and_store(&chunks).await?;
        Ok((source, chunks.len()))
    }

    /// Embed `chunks` batch by batch (members of a batch concurrently), then
    /// upsert every record in a single call once all embeddings are back
    async fn embed_and_store(&self, chunks: &[Chunk]) -> Result<()> {
        let total_batches = chunks.len().div_ceil(self.batch_size);
        let mut records: Vec<VectorRecord> = Vec::with_capacity(chunks.len());

        for (batch_num, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            records.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(embeddings)
                    .map(|(chunk, embedding)| VectorRecord { chunk, embedding }),
            );

            tracing::debug!("Embedded batch {}/{} ({} chunks)", batch_num + 1, total_batches, batch.len());
        }

        self.vector_store.upsert(&records).await?;
        tracing::debug!("Stored {} chunks", records.len());

        Ok(())
    }
}
