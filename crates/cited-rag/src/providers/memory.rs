//! Process-local vector store with brute-force cosine search

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::vector_store::{RetrievedCandidate, VectorRecord, VectorStoreProvider};

/// In-memory vector store keyed by chunk ID (last write wins)
#[derive(Default)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        if let Some(bad) = records.iter().find(|r| r.embedding.is_empty()) {
            return Err(Error::vector_db(format!("Chunk {} has no embedding", bad.chunk.id)));
        }

        let mut map = self.records.write();
        for record in records {
            map.insert(record.chunk.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedCandidate>> {
        let map = self.records.read();
        let mut results: Vec<RetrievedCandidate> = map
            .values()
            .filter(|r| r.embedding.len() == query_embedding.len())
            .map(|r| RetrievedCandidate {
                chunk: r.chunk.clone(),
                similarity: cosine_similarity(&r.embedding, query_embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        results.truncate(top_k);
        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn record(id: u32, content: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            chunk: Chunk::new("doc", "Doc", content.to_string(), 0, content.len(), id),
            embedding,
        }
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        tokio_test::block_on(store.upsert(&[record(0, "old", vec![1.0, 0.0])])).unwrap();
        tokio_test::block_on(store.upsert(&[record(0, "new", vec![0.0, 1.0])])).unwrap();

        assert_eq!(tokio_test::block_on(store.len()).unwrap(), 1);
        let hits = tokio_test::block_on(store.search(&[0.0, 1.0], 5)).unwrap();
        assert_eq!(hits[0].chunk.content, "new");
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[
                record(0, "east", vec![1.0, 0.0]),
                record(1, "north", vec![0.0, 1.0]),
                record(2, "north-east", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let hits = store.search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.content, "north");
        assert_eq!(hits[1].chunk.content, "north-east");
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[tokio::test]
    async fn test_rejects_missing_embedding() {
        let store = InMemoryVectorStore::new();
        let err = store.upsert(&[record(0, "x", vec![])]).await.unwrap_err();
        assert!(matches!(err, Error::VectorDb(_)));
        assert!(store.is_empty().await.unwrap());
    }
}
