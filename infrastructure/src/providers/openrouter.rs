//! OpenRouter adapter (OpenAI chat-completions wire format)
//!
//! Tool calls travel as `function` objects with JSON-encoded argument
//! strings. Streaming uses server-sent events; tool-call arguments arrive as
//! fragments keyed by `index` and are only emitted once a `finish_reason`
//! has been seen. Usage is reported in a trailing chunk when
//! `stream_options.include_usage` is set.

use super::stream_decode::sse_data;
use super::{check_status, map_send_error, normalize_reasoning, segment_events};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use sabha_application::{
    CompletionRequest, EventStream, GatewayError, LlmProvider, stream_via_complete,
};
use sabha_domain::{
    FinishReason, LlmResponse, Message, ProviderKind, ReasoningSplitter, StreamEvent,
    ToolCallAccumulator, ToolDefinition, Usage, estimate_cost,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const STREAM_TIMEOUT: Duration = Duration::from_secs(180);

/// Connection settings shared by every OpenRouter adapter instance
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent as `X-Title` for OpenRouter's app attribution
    pub app_title: String,
    /// Sent as `HTTP-Referer`
    pub referer: String,
    /// Use true SSE streaming; when false, `stream` replays `complete`
    pub streaming: bool,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            app_title: "Sabha".to_string(),
            referer: "http://localhost:3000".to_string(),
            streaming: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }
}

pub struct OpenRouterProvider {
    client: Client,
    config: OpenRouterConfig,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(client: Client, config: OpenRouterConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }

    fn request_body(&self, request: &CompletionRequest, stream: bool) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages.iter().map(wire_message).collect::<Vec<_>>(),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools.iter().map(wire_tool).collect());
        }
        if stream {
            body["stream"] = json!(true);
            body["stream_options"] = json!({ "include_usage": true });
        }
        body
    }

    async fn post(&self, body: &Value, timeout: Duration) -> Result<Response, GatewayError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(provider = "openrouter", model = %self.model, url = %url, "Sending request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError> {
        let body = self.request_body(&request, false);
        let response = self.post(&body, REQUEST_TIMEOUT).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parsed.into_response()
    }

    fn stream(&self, request: CompletionRequest) -> EventStream<'_> {
        if !self.config.streaming {
            return stream_via_complete(self, request);
        }

        Box::pin(async_stream::stream! {
            let body = self.request_body(&request, true);
            let response = match self.post(&body, STREAM_TIMEOUT).await {
                Ok(response) => response,
                Err(e) => {
                    yield StreamEvent::error(e.to_string());
                    return;
                }
            };

            let mut lines = sse_data(response.bytes_stream());
            let mut splitter = ReasoningSplitter::new();
            let mut calls = ToolCallAccumulator::new();
            let mut usage = Usage::default();
            let mut finished = false;

            while let Some(line) = lines.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        yield StreamEvent::error(e.to_string());
                        return;
                    }
                };
                let chunk: StreamChunk = match serde_json::from_str(&line) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(provider = "openrouter", error = %e, "Skipping malformed stream chunk");
                        continue;
                    }
                };

                if let Some(error) = chunk.error {
                    yield StreamEvent::error(format!("OpenRouter stream error: {}", error.message));
                    return;
                }
                if let Some(wire) = chunk.usage {
                    usage = wire.into();
                }

                for choice in chunk.choices {
                    if let Some(reasoning) = choice.delta.reasoning.filter(|r| !r.is_empty()) {
                        yield StreamEvent::reasoning(reasoning);
                    }
                    if let Some(text) = choice.delta.content {
                        for event in segment_events(splitter.push(&text)) {
                            yield event;
                        }
                    }
                    for delta in choice.delta.tool_calls {
                        let (name, arguments) = delta
                            .function
                            .map(|f| (f.name, f.arguments))
                            .unwrap_or_default();
                        calls.push_delta(
                            delta.index.unwrap_or(0),
                            delta.id.as_deref(),
                            name.as_deref(),
                            arguments.as_deref(),
                        );
                    }
                    if choice.finish_reason.is_some() && !finished {
                        finished = true;
                        for event in segment_events(splitter.finish()) {
                            yield event;
                        }
                        for call in calls.finish() {
                            yield StreamEvent::ToolCall { call };
                        }
                    }
                }
            }

            if !finished {
                yield StreamEvent::error("OpenRouter stream ended before a finish reason");
                return;
            }
            yield StreamEvent::done(usage);
        })
    }

    fn estimate_cost(&self, usage: &Usage) -> f64 {
        estimate_cost(ProviderKind::OpenRouter, &self.model, usage)
    }
}

fn wire_message(message: &Message) -> Value {
    let mut wire = json!({
        "role": message.role.as_str(),
        "content": message.content_str(),
    });
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments_json().to_string(),
                    }
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    wire
}

fn wire_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters_schema(),
        }
    })
}

// ==================== Wire types ====================

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

impl From<WireUsage> for Usage {
    fn from(wire: WireUsage) -> Self {
        let mut usage = Usage::new(wire.prompt_tokens, wire.completion_tokens);
        if let Some(total) = wire.total_tokens {
            usage.total_tokens = total;
        }
        usage
    }
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    reasoning: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl ChatResponse {
    fn into_response(self) -> Result<LlmResponse, GatewayError> {
        if let Some(error) = self.error {
            return Err(GatewayError::InvalidResponse(error.message));
        }
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".into()))?;

        let mut calls = ToolCallAccumulator::new();
        for call in &choice.message.tool_calls {
            calls.push_complete(call.id.as_deref(), &call.function.name, &call.function.arguments);
        }
        let (content, reasoning) =
            normalize_reasoning(choice.message.content, choice.message.reasoning);

        Ok(LlmResponse {
            content,
            reasoning,
            tool_calls: calls.finish(),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_vendor)
                .unwrap_or_default(),
            usage: self.usage.map(Usage::from).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
    reasoning: Option<String>,
    #[serde(default)]
    tool_calls: Vec<DeltaToolCall>,
}

#[derive(Debug, Deserialize)]
struct DeltaToolCall {
    index: Option<usize>,
    id: Option<String>,
    function: Option<DeltaFunction>,
}

#[derive(Debug, Deserialize)]
struct DeltaFunction {
    name: Option<String>,
    arguments: Option<String>,
}
