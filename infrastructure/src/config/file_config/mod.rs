//! Raw TOML configuration data types
//!
//! These structs mirror the config file exactly. Parsing into domain types
//! happens in the `parse_*` methods, which report problems as
//! [`ConfigIssue`]s and fall back to defaults instead of failing.

mod embedding;
mod meeting;
mod providers;

pub use embedding::FileEmbeddingConfig;
pub use meeting::FileMeetingConfig;
pub use providers::{FileGeminiConfig, FileOllamaConfig, FileOpenRouterConfig, FileProvidersConfig};

use crate::providers::ProviderSettings;
use sabha_domain::{ConfigIssue, ConfigIssueCode, ProviderKind};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub providers: FileProvidersConfig,
    pub embedding: FileEmbeddingConfig,
    pub meeting: FileMeetingConfig,
}

impl FileConfig {
    /// Validate the whole configuration, returning every issue found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (default_kind, provider_issues) = self.providers.parse_default();
        issues.extend(provider_issues);
        issues.extend(self.embedding.parse_provider().1);
        issues.extend(self.meeting.parse_tools().1);
        issues.extend(self.meeting.parse_end_rule().1);

        let missing_key = match default_kind {
            ProviderKind::OpenRouter => self
                .providers
                .openrouter
                .resolve_api_key()
                .is_none()
                .then_some(&self.providers.openrouter.api_key_env),
            ProviderKind::Gemini => self
                .providers
                .gemini
                .resolve_api_key()
                .is_none()
                .then_some(&self.providers.gemini.api_key_env),
            ProviderKind::Ollama => None,
        };
        if let Some(env) = missing_key {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingApiKey,
                format!(
                    "providers.default is '{}' but no API key is set (api_key or ${})",
                    default_kind, env
                ),
            ));
        }

        issues
    }

    /// Settings for the provider registry, with API keys resolved
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            defaults: self.providers.defaults(),
            openrouter: self.providers.openrouter.to_config(),
            ollama: self.providers.ollama.to_config(),
            gemini: self.providers.gemini.to_config(),
        }
    }
}
