//! Ollama adapter (local inference daemon, `/api/chat`)
//!
//! Streaming responses are newline-delimited JSON objects; the last one
//! carries `done: true` and the token counts. Reasoning models expose their
//! thoughts either in `message.thinking` or inline as `<think>` blocks.

use super::stream_decode::ndjson;
use super::{check_status, map_send_error, normalize_reasoning, segment_events};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use sabha_application::{CompletionRequest, EventStream, GatewayError, LlmProvider};
use sabha_domain::{
    FinishReason, LlmResponse, Message, ReasoningSplitter, StreamEvent, ToolCallAccumulator,
    ToolDefinition, Usage,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const STREAM_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
    model: String,
}

impl OllamaProvider {
    pub fn new(client: Client, config: OllamaConfig, model: impl Into<String>) -> Self {
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
            "stream": stream,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools.iter().map(wire_tool).collect());
        }
        body
    }

    async fn post(&self, body: &Value, timeout: Duration) -> Result<Response, GatewayError> {
        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        debug!(provider = "ollama", model = %self.model, url = %url, "Sending request");

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError> {
        let body = self.request_body(&request, false);
        let response = self.post(&body, REQUEST_TIMEOUT).await?;
        let parsed: ChatChunk = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if let Some(error) = parsed.error {
            return Err(GatewayError::InvalidResponse(error));
        }

        let mut calls = ToolCallAccumulator::new();
        let message = parsed.message.unwrap_or_default();
        for call in &message.tool_calls {
            calls.push_complete(call.id.as_deref(), &call.function.name, &call.function.arguments);
        }
        let (content, reasoning) = normalize_reasoning(message.content, message.thinking);
        let tool_calls = calls.finish();
        let finish_reason = if !tool_calls.is_empty() {
            FinishReason::ToolCalls
        } else {
            parsed
                .done_reason
                .as_deref()
                .map(FinishReason::from_vendor)
                .unwrap_or_default()
        };

        Ok(LlmResponse {
            content,
            reasoning,
            tool_calls,
            finish_reason,
            usage: Usage::new(parsed.prompt_eval_count, parsed.eval_count),
        })
    }

    fn stream(&self, request: CompletionRequest) -> EventStream<'_> {
        Box::pin(async_stream::stream! {
            let body = self.request_body(&request, true);
            let response = match self.post(&body, STREAM_TIMEOUT).await {
                Ok(response) => response,
                Err(e) => {
                    yield StreamEvent::error(e.to_string());
                    return;
                }
            };

            let mut lines = ndjson(response.bytes_stream());
            let mut splitter = ReasoningSplitter::new();
            let mut calls = ToolCallAccumulator::new();

            while let Some(line) = lines.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        yield StreamEvent::error(e.to_string());
                        return;
                    }
                };
                let chunk: ChatChunk = match serde_json::from_str(&line) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(provider = "ollama", error = %e, "Skipping malformed stream line");
                        continue;
                    }
                };

                if let Some(error) = chunk.error {
                    yield StreamEvent::error(format!("Ollama stream error: {}", error));
                    return;
                }
                if let Some(message) = chunk.message {
                    if let Some(thinking) = message.thinking.filter(|t| !t.is_empty()) {
                        yield StreamEvent::reasoning(thinking);
                    }
                    if let Some(text) = message.content {
                        for event in segment_events(splitter.push(&text)) {
                            yield event;
                        }
                    }
                    for call in &message.tool_calls {
                        calls.push_complete(call.id.as_deref(), &call.function.name, &call.function.arguments);
                    }
                }
                if chunk.done {
                    for event in segment_events(splitter.finish()) {
                        yield event;
                    }
                    for call in calls.finish() {
                        yield StreamEvent::ToolCall { call };
                    }
                    yield StreamEvent::done(Usage::new(chunk.prompt_eval_count, chunk.eval_count));
                    return;
                }
            }

            yield StreamEvent::error("Ollama stream ended before done");
        })
    }

    /// Local inference is free
    fn estimate_cost(&self, _usage: &Usage) -> f64 {
        0.0
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
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments_json(),
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

/// One `/api/chat` object; the blocking response has the same shape as the
/// final streamed line.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    thinking: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: Option<String>,
    function: WireFunction,
}

/// `arguments` is normally an object but some models send a JSON string;
/// the accumulator accepts both.
#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}
