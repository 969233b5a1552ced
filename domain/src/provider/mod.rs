//! Provider selection for participants.
//!
//! A participant's [`ProviderConfig`] may leave provider and model empty,
//! meaning "use the process-wide default". The orchestrator captures one
//! [`ProviderDefaults`] snapshot at the start of a turn and resolves the
//! participant config against it, so a concurrent defaults change never
//! splits a turn across two configurations.

pub mod pricing;

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote multi-model aggregator (OpenAI-compatible wire format)
    #[default]
    OpenRouter,
    /// Local inference daemon
    Ollama,
    /// Google Gemini API
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenRouter, ProviderKind::Ollama, ProviderKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "ollama" => Ok(ProviderKind::Ollama),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

/// Per-participant provider settings; empty strings inherit the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: String::new(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Resolve against a defaults snapshot.
    pub fn resolve(&self, defaults: &ProviderDefaults) -> Result<ResolvedProviderConfig, DomainError> {
        let kind = if self.provider.trim().is_empty() {
            defaults.provider
        } else {
            self.provider.parse()?
        };
        let model = if self.model.trim().is_empty() {
            defaults.model_for(kind).to_string()
        } else {
            self.model.trim().to_string()
        };

        Ok(ResolvedProviderConfig {
            kind,
            model,
            temperature: self.temperature,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        })
    }
}

/// Process-wide provider defaults, captured as a snapshot per turn
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDefaults {
    pub provider: ProviderKind,
    pub openrouter_model: String,
    pub ollama_model: String,
    pub gemini_model: String,
    pub max_tokens: u32,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenRouter,
            openrouter_model: "anthropic/claude-sonnet-4-20250514".to_string(),
            ollama_model: "llama3.2".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            max_tokens: 2048,
        }
    }
}

impl ProviderDefaults {
    pub fn model_for(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::OpenRouter => &self.openrouter_model,
            ProviderKind::Ollama => &self.ollama_model,
            ProviderKind::Gemini => &self.gemini_model,
        }
    }
}

/// Fully resolved, immutable provider settings for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}
