//! Embedding configuration from TOML (`[embedding]` section)

use sabha_domain::{ConfigIssue, ConfigIssueCode, ProviderKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmbeddingConfig {
    /// "ollama" or "gemini"
    pub provider: String,
    pub model: String,
}

impl Default for FileEmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
        }
    }
}

impl FileEmbeddingConfig {
    /// Parse `provider`; only Ollama and Gemini serve embeddings.
    pub fn parse_provider(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind @ (ProviderKind::Ollama | ProviderKind::Gemini)) => (kind, Vec::new()),
            _ => (
                ProviderKind::Ollama,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownEmbeddingProvider,
                    format!(
                        "embedding.provider: '{}' cannot serve embeddings, falling back to 'ollama'",
                        self.provider
                    ),
                )],
            ),
        }
    }
}
