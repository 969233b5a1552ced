//! LLM provider port
//!
//! Defines the interface every provider adapter implements: one blocking
//! completion and one normalized event stream.

use async_trait::async_trait;
use futures::Stream;
use sabha_domain::{
    LlmResponse, Message, ProviderDefaults, ResolvedProviderConfig, StreamEvent, ToolDefinition,
    Usage,
};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while talking to a provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// One request to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    /// Tools offered to the model; empty disables tool calling
    pub tools: Vec<ToolDefinition>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A lazily evaluated, single-use stream of normalized events.
///
/// Every stream ends with exactly one `Done` or `Error` event.
pub type EventStream<'a> = Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>;

/// Provider adapter
///
/// Implementations live in the infrastructure layer. Adapters without native
/// streaming keep the default [`stream`](LlmProvider::stream), which replays
/// a blocking completion as events.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier (e.g., "openrouter")
    fn name(&self) -> &'static str;

    /// Model served by this adapter instance
    fn model(&self) -> &str;

    /// Blocking completion
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError>;

    /// Streamed completion; failures surface as a terminal `Error` event.
    fn stream(&self, request: CompletionRequest) -> EventStream<'_> {
        stream_via_complete(self, request)
    }

    /// Estimated USD cost of `usage` on this adapter's model
    fn estimate_cost(&self, usage: &Usage) -> f64;
}

/// Stream a blocking completion: reasoning, the whole text as one delta,
/// each tool call, then `Done`. A failed completion yields a single `Error`.
pub fn stream_via_complete<P>(provider: &P, request: CompletionRequest) -> EventStream<'_>
where
    P: LlmProvider + ?Sized,
{
    Box::pin(async_stream::stream! {
        match provider.complete(request).await {
            Ok(response) => {
                for event in response_events(response) {
                    yield event;
                }
            }
            Err(e) => yield StreamEvent::error(e.to_string()),
        }
    })
}

/// The event sequence equivalent to a completed response.
pub fn response_events(response: LlmResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    if let Some(reasoning) = response.reasoning.filter(|r| !r.is_empty()) {
        events.push(StreamEvent::reasoning(reasoning));
    }
    if let Some(content) = response.content.filter(|c| !c.is_empty()) {
        events.push(StreamEvent::text(content));
    }
    for call in response.tool_calls {
        events.push(StreamEvent::ToolCall { call });
    }
    events.push(StreamEvent::done(response.usage));
    events
}

/// Builds provider adapters and owns the process-wide defaults.
pub trait ProviderFactory: Send + Sync {
    /// Snapshot of the current defaults
    fn defaults(&self) -> ProviderDefaults;

    /// Create an adapter for a resolved configuration
    fn create(&self, config: &ResolvedProviderConfig) -> Result<Arc<dyn LlmProvider>, GatewayError>;
}
