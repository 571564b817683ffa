//! Fake providers for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, LlmError, Result};
use crate::providers::{
    EmbeddingProvider, LlmProvider, RankedResult, RerankHit, RerankProvider, RetrievedCandidate,
};
use crate::types::Chunk;

const VOCAB_DIMS: usize = 128;

/// Ranked result for a single-chunk document
pub fn ranked(source: &str, title: &str, content: &str) -> RankedResult {
    RankedResult {
        candidate: RetrievedCandidate {
            chunk: Chunk::new(source, title, content.to_string(), 0, content.chars().count(), 0),
            similarity: 0.9,
        },
        relevance_score: 0.9,
    }
}

/// LLM that answers per model from a script. Unscripted models are unavailable.
#[derive(Default)]
pub struct ScriptedLlm {
    script: HashMap<String, std::result::Result<String, LlmError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, text: &str) -> Self {
        self.script.insert(model.to_string(), Ok(text.to_string()));
        self
    }

    pub fn fail(mut self, model: &str, error: LlmError) -> Self {
        self.script.insert(model.to_string(), Err(error));
        self
    }

    /// Models called, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, model: &str, _prompt: &str) -> std::result::Result<String, LlmError> {
        self.calls.lock().push(model.to_string());
        self.script.get(model).cloned().unwrap_or_else(|| {
            Err(LlmError::ModelUnavailable {
                model: model.to_string(),
            })
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Bag-of-words embedder: each lowercase word is hashed into one of a
/// fixed number of buckets. Texts sharing words get similar vectors.
#[derive(Default)]
pub struct KeywordEmbedder {
    fail_on: Option<String>,
    embed_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any text containing `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Sizes of each `embed_batch` call, in order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().clone()
    }
}

fn bucket(word: &str) -> usize {
    word.bytes().fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize)) % VOCAB_DIMS
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                return Err(Error::embedding("HTTP 500 - injected failure"));
            }
        }

        let mut vector = vec![0.0; VOCAB_DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_sizes.lock().push(texts.len());
        futures::future::try_join_all(texts.iter().map(|t| self.embed(t))).await
    }

    fn dimensions(&self) -> usize {
        VOCAB_DIMS
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Reranker that returns a fixed list of hits and records the documents it saw
#[derive(Default)]
pub struct FixedReranker {
    hits: Option<Vec<RerankHit>>,
    seen: Mutex<Vec<String>>,
}

impl FixedReranker {
    /// Keep the first `top_n` documents in order
    pub fn in_order() -> Self {
        Self::default()
    }

    /// Always answer with `hits`
    pub fn with_hits(hits: Vec<RerankHit>) -> Self {
        Self {
            hits: Some(hits),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl RerankProvider for FixedReranker {
    async fn rerank(&self, _query: &str, documents: &[String], top_n: usize) -> Result<Vec<RerankHit>> {
        *self.seen.lock() = documents.to_vec();
        Ok(match &self.hits {
            Some(hits) => hits.clone(),
            None => (0..documents.len().min(top_n))
                .map(|index| RerankHit {
                    index,
                    relevance_score: 1.0 / (index as f32 + 1.0),
                })
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
