//! Embedding adapters
//!
//! Vectors come from either a local Ollama daemon or the Gemini embedding
//! endpoint. The vector dimension is known up front from the model name so
//! collections can be created before the first document is embedded.

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiEmbedder;
pub use ollama::OllamaEmbedder;

use crate::providers::{GeminiConfig, OllamaConfig};
use reqwest::Client;
use sabha_application::{EmbeddingProvider, KnowledgeError};
use sabha_domain::ProviderKind;
use std::sync::Arc;

/// Build the configured embedder.
///
/// OpenRouter has no embedding endpoint, so it is rejected here.
pub fn create_embedder(
    client: Client,
    kind: ProviderKind,
    model: &str,
    ollama: &OllamaConfig,
    gemini: &GeminiConfig,
) -> Result<Arc<dyn EmbeddingProvider>, KnowledgeError> {
    match kind {
        ProviderKind::Ollama => Ok(Arc::new(OllamaEmbedder::new(client, ollama.clone(), model))),
        ProviderKind::Gemini => {
            if gemini.api_key.trim().is_empty() {
                return Err(KnowledgeError::Embedding(
                    "Gemini API key is not configured".to_string(),
                ));
            }
            Ok(Arc::new(GeminiEmbedder::new(client, gemini.clone(), model)))
        }
        ProviderKind::OpenRouter => Err(KnowledgeError::Embedding(
            "openrouter does not provide embeddings; use ollama or gemini".to_string(),
        )),
    }
}

/// Map a transport or status failure into the knowledge taxonomy
pub(crate) fn embedding_error(context: &str, e: impl std::fmt::Display) -> KnowledgeError {
    KnowledgeError::Embedding(format!("{}: {}", context, e))
}
