//! Supabase (pgvector over PostgREST) vector store
//!
//! Chunks live in a `documents` table keyed by chunk ID. Search goes through
//! the `match_documents` function from [`setup_sql`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkMetadata};

use super::vector_store::{RetrievedCandidate, VectorRecord, VectorStoreProvider};

/// Supabase-backed vector store
pub struct SupabaseVectorStore {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Serialize)]
struct DocumentRow<'a> {
    id: &'a str,
    content: &'a str,
    embedding: &'a [f32],
    metadata: &'a ChunkMetadata,
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

#[derive(Deserialize)]
struct MatchRow {
    id: String,
    content: String,
    metadata: ChunkMetadata,
    similarity: f32,
}

impl From<MatchRow> for RetrievedCandidate {
    fn from(row: MatchRow) -> Self {
        RetrievedCandidate {
            chunk: Chunk {
                id: row.id,
                content: row.content,
                metadata: row.metadata,
            },
            similarity: row.similarity,
        }
    }
}

impl SupabaseVectorStore {
    /// Create from config. Fails unless both URL and service key are set.
    pub fn new(config: &VectorDbConfig) -> Result<Self> {
        let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
            return Err(Error::Config(
                "Supabase URL and service role key are required".to_string(),
            ));
        };

        Ok(Self {
            client: Client::builder().build()?,
            base_url: url.trim_end_matches('/').to_string(),
            service_key: key.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::vector_db(format!("Failed to {}: HTTP {} - {}", what, status, body)))
}

#[async_trait]
impl VectorStoreProvider for SupabaseVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let rows: Vec<DocumentRow<'_>> = records
            .iter()
            .map(|r| DocumentRow {
                id: &r.chunk.id,
                content: &r.chunk.content,
                embedding: &r.embedding,
                metadata: &r.chunk.metadata,
            })
            .collect();

        let response = self
            .request(reqwest::Method::POST, "documents?on_conflict=id")
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Upsert request failed: {}", e)))?;

        check(response, "upsert documents").await?;
        tracing::debug!("Upserted {} rows into Supabase", rows.len());
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedCandidate>> {
        let request = MatchRequest {
            query_embedding,
            match_count: top_k,
        };

        let response = self
            .request(reqwest::Method::POST, "rpc/match_documents")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Search request failed: {}", e)))?;

        let rows: Vec<MatchRow> = check(response, "search documents")
            .await?
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse search results: {}", e)))?;

        Ok(rows.into_iter().map(RetrievedCandidate::from).collect())
    }

    async fn len(&self) -> Result<usize> {
        let response = self
            .request(reqwest::Method::GET, "documents?select=id")
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Count request failed: {}", e)))?;

        let response = check(response, "count documents").await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        parse_content_range_total(range)
            .ok_or_else(|| Error::vector_db(format!("Unexpected Content-Range: {:?}", range)))
    }

    fn name(&self) -> &str {
        "supabase"
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-0/42` or `*/0`
fn parse_content_range_total(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// SQL that creates the `documents` table, its vector index and the
/// `match_documents` search function for the given embedding size
pub fn setup_sql(dimensions: usize) -> String {
    format!(
        r#"-- Enable pgvector extension
CREATE EXTENSION IF NOT EXISTS vector;

-- Create documents table
CREATE TABLE IF NOT EXISTS documents (
  id TEXT PRIMARY KEY,
  content TEXT NOT NULL,
  embedding VECTOR({dim}),
  metadata JSONB,
  created_at TIMESTAMPTZ DEFAULT NOW()
);

-- Create index for faster similarity search
CREATE INDEX IF NOT EXISTS documents_embedding_idx ON documents
USING ivfflat (embedding vector_cosine_ops) WITH (lists = 100);

-- Create or replace search function
CREATE OR REPLACE FUNCTION match_documents(
  query_embedding VECTOR({dim}),
  match_count INT DEFAULT 10
)
RETURNS TABLE (
  id TEXT,
  content TEXT,
  metadata JSONB,
  similarity FLOAT
)
LANGUAGE plpgsql
AS $$
BEGIN
  RETURN QUERY
  SELECT
    documents.id,
    documents.content,
    documents.metadata,
    1 - (documents.embedding <=> query_embedding) AS similarity
  FROM documents
  ORDER BY documents.embedding <=> query_embedding
  LIMIT match_count;
END;
$$;
"#,
        dim = dimensions
    )
}
