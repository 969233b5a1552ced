//! Ollama embeddings (`/api/embeddings`)

use super::embedding_error;
use crate::providers::OllamaConfig;
use async_trait::async_trait;
use reqwest::Client;
use sabha_application::{EmbeddingProvider, KnowledgeError};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_DIMENSION: usize = 768;

/// Known output sizes by model family
const MODEL_DIMENSIONS: &[(&str, usize)] = &[
    ("nomic-embed-text", 768),
    ("mxbai-embed-large", 1024),
    ("all-minilm", 384),
    ("snowflake-arctic-embed", 1024),
    ("qwen3-embedding", 1024),
];

pub struct OllamaEmbedder {
    client: Client,
    config: OllamaConfig,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: Client, config: OllamaConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    fn dimension(&self) -> usize {
        MODEL_DIMENSIONS
            .iter()
            .find(|(family, _)| self.model.starts_with(family))
            .map(|(_, dimension)| *dimension)
            .unwrap_or(DEFAULT_DIMENSION)
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        let url = format!("{}/api/embeddings", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.model, chars = text.len(), "Embedding text");

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|e| embedding_error("ollama request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(embedding_error(
                &format!("ollama returned HTTP {}", status.as_u16()),
                body.trim(),
            ));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| embedding_error("invalid ollama embedding response", e))?;
        if parsed.embedding.is_empty() {
            return Err(KnowledgeError::Embedding(format!(
                "ollama returned an empty embedding for {}",
                self.model
            )));
        }
        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_embed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(json!({"model": "all-minilm", "prompt": "churn rate"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2, 0.3]})),
            )
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(Client::new(), OllamaConfig::new(server.uri()), "all-minilm");

        assert_eq!(embedder.embed_text("churn rate").await.unwrap(), vec![0.1, 0.2, 0.3]);
        assert_eq!(embedder.dimension(), 384);
    }

    #[tokio::test]
    async fn test_http_failure_is_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(Client::new(), OllamaConfig::new(server.uri()), "missing");
        let err = embedder.embed_text("x").await.unwrap_err();

        assert_eq!(
            err,
            KnowledgeError::Embedding("ollama returned HTTP 404: model not found".into())
        );
        assert_eq!(embedder.dimension(), DEFAULT_DIMENSION);
    }

    #[tokio::test]
    async fn test_batch_uses_one_request_per_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0]})))
            .expect(2)
            .mount(&server)
            .await;

        let embedder =
            OllamaEmbedder::new(Client::new(), OllamaConfig::new(server.uri()), "nomic-embed-text");
        let vectors = embedder
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 2);
    }
}
