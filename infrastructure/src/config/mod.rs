//! Configuration loading for sabha
//!
//! Sources are merged with figment, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. Global: `$XDG_CONFIG_HOME/sabha/config.toml`
//! 3. Project: `./sabha.toml`
//! 4. `--config <path>`
//! 5. `SABHA_*` environment variables (`__` separates nested keys,
//!    e.g. `SABHA_PROVIDERS__DEFAULT=ollama`)

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileEmbeddingConfig, FileGeminiConfig, FileMeetingConfig, FileOllamaConfig,
    FileOpenRouterConfig, FileProvidersConfig,
};
pub use loader::ConfigLoader;
