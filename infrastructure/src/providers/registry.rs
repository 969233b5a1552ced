//! Provider registry
//!
//! Owns one shared HTTP client and the process-wide [`ProviderDefaults`].
//! Adapters are cheap and created per turn from a resolved config.

use super::{GeminiConfig, GeminiProvider, OllamaConfig, OllamaProvider, OpenRouterConfig, OpenRouterProvider};
use reqwest::Client;
use sabha_application::{GatewayError, LlmProvider, ProviderFactory};
use sabha_domain::{ProviderDefaults, ProviderKind, ResolvedProviderConfig};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Everything needed to build adapters for all three backends
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub defaults: ProviderDefaults,
    pub openrouter: OpenRouterConfig,
    pub ollama: OllamaConfig,
    pub gemini: GeminiConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            defaults: ProviderDefaults::default(),
            openrouter: OpenRouterConfig::new(""),
            ollama: OllamaConfig::default(),
            gemini: GeminiConfig::new(""),
        }
    }
}

pub struct ProviderRegistry {
    client: Client,
    openrouter: OpenRouterConfig,
    ollama: OllamaConfig,
    gemini: GeminiConfig,
    defaults: RwLock<ProviderDefaults>,
}

impl ProviderRegistry {
    pub fn new(settings: ProviderSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(client: Client, settings: ProviderSettings) -> Self {
        Self {
            client,
            openrouter: settings.openrouter,
            ollama: settings.ollama,
            gemini: settings.gemini,
            defaults: RwLock::new(settings.defaults),
        }
    }

    /// Replace the defaults; turns already running keep their snapshot.
    pub fn set_defaults(&self, defaults: ProviderDefaults) {
        info!(
            provider = %defaults.provider,
            model = defaults.model_for(defaults.provider),
            "Provider defaults changed"
        );
        *self.defaults.write().unwrap_or_else(|e| e.into_inner()) = defaults;
    }

    /// Backends that have the credentials they need
    pub fn available(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.missing_credential(*kind).is_none())
            .collect()
    }

    fn missing_credential(&self, kind: ProviderKind) -> Option<&'static str> {
        match kind {
            ProviderKind::OpenRouter if self.openrouter.api_key.trim().is_empty() => {
                Some("OpenRouter API key is not configured")
            }
            ProviderKind::Gemini if self.gemini.api_key.trim().is_empty() => {
                Some("Gemini API key is not configured")
            }
            _ => None,
        }
    }
}

impl ProviderFactory for ProviderRegistry {
    fn defaults(&self) -> ProviderDefaults {
        self.defaults.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn create(&self, config: &ResolvedProviderConfig) -> Result<Arc<dyn LlmProvider>, GatewayError> {
        if let Some(reason) = self.missing_credential(config.kind) {
            return Err(GatewayError::Configuration(reason.to_string()));
        }
        debug!(provider = %config.kind, model = %config.model, "Creating provider adapter");

        let provider: Arc<dyn LlmProvider> = match config.kind {
            ProviderKind::OpenRouter => Arc::new(OpenRouterProvider::new(
                self.client.clone(),
                self.openrouter.clone(),
                &config.model,
            )),
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(
                self.client.clone(),
                self.ollama.clone(),
                &config.model,
            )),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(
                self.client.clone(),
                self.gemini.clone(),
                &config.model,
            )),
        };
        Ok(provider)
    }
}
