//! Gemini embeddings (`batchEmbedContents`)

use super::embedding_error;
use crate::providers::GeminiConfig;
use async_trait::async_trait;
use reqwest::Client;
use sabha_application::{EmbeddingProvider, KnowledgeError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_DIMENSION: usize = 768;

const MODEL_DIMENSIONS: &[(&str, usize)] = &[("text-embedding-004", 768), ("embedding-001", 768)];

pub struct GeminiEmbedder {
    client: Client,
    config: GeminiConfig,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(client: Client, config: GeminiConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.model.trim_start_matches("models/"))
    }
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    fn name(&self) -> String {
        format!("gemini:{}", self.model)
    }

    fn dimension(&self) -> usize {
        MODEL_DIMENSIONS
            .iter()
            .find(|(family, _)| self.model.ends_with(family))
            .map(|(_, dimension)| *dimension)
            .unwrap_or(DEFAULT_DIMENSION)
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| KnowledgeError::Embedding("gemini returned no embeddings".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model_path();
        let url = format!(
            "{}/{}:batchEmbedContents",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        debug!(model = %self.model, count = texts.len(), "Embedding batch");

        let requests: Vec<Value> = texts
            .iter()
            .map(|text| json!({ "model": model, "content": { "parts": [{ "text": text }] } }))
            .collect();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(|e| embedding_error("gemini request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(embedding_error(
                &format!("gemini returned HTTP {}", status.as_u16()),
                body.trim(),
            ));
        }

        let parsed: BatchResponse = response
            .json()
            .await
            .map_err(|e| embedding_error("invalid gemini embedding response", e))?;
        if parsed.embeddings.len() != texts.len() {
            return Err(KnowledgeError::Embedding(format!(
                "gemini returned {} embeddings for {} texts",
                parsed.embeddings.len(),
                texts.len()
            )));
        }
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}
