//! Cohere rerank client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::RerankConfig;
use crate::error::{Error, Result};

use super::reranker::{RerankHit, RerankProvider};

/// Cohere rerank API client
pub struct CohereReranker {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResultEntry>,
}

#[derive(Deserialize)]
struct RerankResultEntry {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    /// Create a new reranker. Fails without an API key.
    pub fn new(config: &RerankConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("COHERE_API_KEY is not set".to_string()))?;

        Ok(Self {
            client: Client::builder().build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl RerankProvider for CohereReranker {
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>> {
        if documents.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        let response = self
            .client
            .post(format!("{}/rerank", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::rerank(format!("Cohere request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::rerank(format!("Cohere rerank failed ({}): {}", status, body)));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::rerank(format!("Failed to parse Cohere response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RerankHit {
                index: r.index,
                relevance_score: r.relevance_score,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "cohere"
    }
}
