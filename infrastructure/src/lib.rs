//! Infrastructure layer for sabha
//!
//! Adapters implementing the ports defined in the application layer:
//! LLM providers, embeddings, in-memory storage and vector search, the
//! meeting tool executor, the JSONL transcript and configuration loading.

pub mod config;
pub mod embedding;
pub mod knowledge;
pub mod logging;
pub mod providers;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileEmbeddingConfig, FileMeetingConfig, FileProvidersConfig,
};
pub use embedding::{GeminiEmbedder, OllamaEmbedder, create_embedder};
pub use knowledge::{InMemoryKnowledgeScopes, InMemoryVectorIndex};
pub use logging::JsonlConversationLogger;
pub use providers::{
    GeminiConfig, GeminiProvider, OllamaConfig, OllamaProvider, OpenRouterConfig,
    OpenRouterProvider, ProviderRegistry, ProviderSettings,
};
pub use store::InMemoryMeetingStore;
pub use tools::{MeetingToolExecutor, default_tool_spec, full_tool_spec, tool_spec_for};
