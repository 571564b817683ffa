//! Request types for the query and ingestion entry points

use serde::{Deserialize, Serialize};

/// Question to answer from the indexed corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    #[serde(default)]
    pub query: String,

    /// Candidates fetched from vector search (default from config)
    #[serde(default, alias = "topK")]
    pub top_k: Option<usize>,

    /// Results kept after reranking (default from config)
    #[serde(default, alias = "topN")]
    pub top_n: Option<usize>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Override the number of candidates to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Override the number of reranked results to keep
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }
}

/// Raw text to chunk, embed and store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Document text
    #[serde(default)]
    pub text: String,
    /// Source document identifier (default `doc-<unix millis>`)
    #[serde(default)]
    pub source: Option<String>,
    /// Document title (default `Untitled Document`)
    #[serde(default)]
    pub title: Option<String>,
}

impl IngestRequest {
    /// Create a new ingest request
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the source identifier
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
