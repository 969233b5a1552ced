//! Provider configuration from TOML (`[providers]` section)

use crate::providers::{GeminiConfig, OllamaConfig, OpenRouterConfig, gemini, ollama, openrouter};
use sabha_domain::{ConfigIssue, ConfigIssueCode, ProviderDefaults, ProviderKind};
use serde::{Deserialize, Serialize};

/// Direct key first, then the named environment variable
fn resolve_key(direct: &Option<String>, env: &str) -> Option<String> {
    direct
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env).ok().filter(|k| !k.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenRouterConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    /// Sent as X-Title for app attribution
    pub app_title: String,
    /// Use SSE streaming; when false, streams replay a blocking completion
    pub streaming: bool,
}

impl Default for FileOpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            api_key: None,
            base_url: openrouter::DEFAULT_BASE_URL.to_string(),
            default_model: ProviderDefaults::default().openrouter_model,
            app_title: "Sabha".to_string(),
            streaming: true,
        }
    }
}

impl FileOpenRouterConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, &self.api_key_env)
    }

    pub fn to_config(&self) -> OpenRouterConfig {
        let mut config = OpenRouterConfig::new(self.resolve_api_key().unwrap_or_default())
            .with_base_url(&self.base_url)
            .with_streaming(self.streaming);
        config.app_title = self.app_title.clone();
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    pub base_url: String,
    pub default_model: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            base_url: ollama::DEFAULT_BASE_URL.to_string(),
            default_model: ProviderDefaults::default().ollama_model,
        }
    }
}

impl FileOllamaConfig {
    pub fn to_config(&self) -> OllamaConfig {
        OllamaConfig::new(&self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
            default_model: ProviderDefaults::default().gemini_model,
        }
    }
}

impl FileGeminiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, &self.api_key_env)
    }

    pub fn to_config(&self) -> GeminiConfig {
        GeminiConfig::new(self.resolve_api_key().unwrap_or_default()).with_base_url(&self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Default provider: "openrouter", "ollama" or "gemini"
    pub default: Option<String>,
    /// Default max tokens per response
    pub max_tokens: u32,
    pub openrouter: FileOpenRouterConfig,
    pub ollama: FileOllamaConfig,
    pub gemini: FileGeminiConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: None,
            max_tokens: ProviderDefaults::default().max_tokens,
            openrouter: FileOpenRouterConfig::default(),
            ollama: FileOllamaConfig::default(),
            gemini: FileGeminiConfig::default(),
        }
    }
}

impl FileProvidersConfig {
    /// Parse `default`, falling back to OpenRouter.
    pub fn parse_default(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        let Some(raw) = self.default.as_deref().filter(|s| !s.trim().is_empty()) else {
            return (ProviderKind::default(), Vec::new());
        };
        match raw.parse() {
            Ok(kind) => (kind, Vec::new()),
            Err(_) => (
                ProviderKind::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownProvider,
                    format!(
                        "providers.default: unknown provider '{}', falling back to '{}'",
                        raw,
                        ProviderKind::default()
                    ),
                )],
            ),
        }
    }

    pub fn defaults(&self) -> ProviderDefaults {
        ProviderDefaults {
            provider: self.parse_default().0,
            openrouter_model: self.openrouter.default_model.clone(),
            ollama_model: self.ollama.default_model.clone(),
            gemini_model: self.gemini.default_model.clone(),
            max_tokens: self.max_tokens,
        }
    }
}
