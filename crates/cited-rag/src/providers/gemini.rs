//! Gemini client for embeddings and answer generation
//!
//! Talks to the Generative Language API with an API key. One client serves
//! every model in the fallback list; the model is chosen per call.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::{EmbeddingConfig, GenerationConfig};
use crate::error::{Error, LlmError, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
    embed_model: String,
    dimensions: usize,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new Gemini client. Fails without an API key.
    pub fn new(embeddings: &EmbeddingConfig, generation: &GenerationConfig) -> Result<Self> {
        let api_key = generation
            .api_key
            .clone()
            .or_else(|| embeddings.api_key.clone())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(generation.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            api_base: generation.api_base.trim_end_matches('/').to_string(),
            api_key,
            embed_model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
        })
    }

    /// Get the API endpoint URL for a model method
    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, model, method)
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(serde::Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationParams,
}

#[derive(serde::Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationParams {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", self.embed_model),
            content: Content {
                role: None,
                parts: vec![Part { text: text.to_string() }],
            },
        };

        let response = self
            .client
            .post(self.endpoint(&self.embed_model, "embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Gemini embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Gemini embedding failed ({}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse Gemini embedding: {}", e)))?;

        Ok(embed_response.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> std::result::Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt.to_string() }],
            }],
            generation_config: GenerationParams {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint(model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                message: format!("Gemini request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(model, status.as_u16(), &body));
        }

        let gen_response: GenerateResponse =
            response.json().await.map_err(|e| LlmError::ResponseParse {
                message: e.to_string(),
            })?;

        gen_response.into_text().ok_or_else(|| LlmError::EmptyResponse {
            model: model.to_string(),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
