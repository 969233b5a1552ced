//! Google Gemini adapter (`generateContent` / `streamGenerateContent`)
//!
//! Gemini has no system role: system messages are joined into
//! `systemInstruction`. Assistant turns use the `model` role, and tool
//! results are sent back as `functionResponse` parts, which are matched by
//! function name rather than call id.

use super::stream_decode::sse_data;
use super::{check_status, map_send_error, segment_events};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use sabha_application::{CompletionRequest, EventStream, GatewayError, LlmProvider};
use sabha_domain::{
    FinishReason, LlmResponse, Message, ProviderKind, ReasoningSplitter, Role, StreamEvent,
    ToolCallAccumulator, Usage, estimate_cost, split_reasoning,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const STREAM_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: Client, config: GeminiConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let (system, contents) = wire_contents(&request.messages);
        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        });
        if let Some(system) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters_schema(),
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }
        body
    }

    async fn post(&self, action: &str, body: &Value, timeout: Duration) -> Result<Response, GatewayError> {
        let url = format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.model,
            action
        );
        debug!(provider = "gemini", model = %self.model, url = %url, "Sending request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        check_status(response).await
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError> {
        let body = self.request_body(&request);
        let response = self.post("generateContent", &body, REQUEST_TIMEOUT).await?;
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parsed.into_response()
    }

    fn stream(&self, request: CompletionRequest) -> EventStream<'_> {
        Box::pin(async_stream::stream! {
            let body = self.request_body(&request);
            let response = match self
                .post("streamGenerateContent?alt=sse", &body, STREAM_TIMEOUT)
                .await
            {
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
                let chunk: GenerateResponse = match serde_json::from_str(&line) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(provider = "gemini", error = %e, "Skipping malformed stream chunk");
                        continue;
                    }
                };

                if let Some(error) = chunk.error {
                    yield StreamEvent::error(format!("Gemini stream error: {}", error.message));
                    return;
                }
                if let Some(metadata) = chunk.usage_metadata {
                    usage = metadata.into();
                }
                let Some(candidate) = chunk.candidates.into_iter().next() else {
                    continue;
                };
                for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                    if let Some(call) = part.function_call {
                        calls.push_complete(call.id.as_deref(), &call.name, &call.args);
                    } else if let Some(text) = part.text {
                        if part.thought {
                            if !text.is_empty() {
                                yield StreamEvent::reasoning(text);
                            }
                        } else {
                            for event in segment_events(splitter.push(&text)) {
                                yield event;
                            }
                        }
                    }
                }
                // usage may still follow in a later chunk, so flushing waits for the body to end
                if candidate.finish_reason.is_some() {
                    finished = true;
                }
            }

            if !finished {
                yield StreamEvent::error("Gemini stream ended before a finish reason");
                return;
            }
            for event in segment_events(splitter.finish()) {
                yield event;
            }
            for call in calls.finish() {
                yield StreamEvent::ToolCall { call };
            }
            yield StreamEvent::done(usage);
        })
    }

    fn estimate_cost(&self, usage: &Usage) -> f64 {
        estimate_cost(ProviderKind::Gemini, &self.model, usage)
    }
}

/// Convert the unified transcript into `(systemInstruction, contents)`.
fn wire_contents(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system = Vec::new();
    let mut contents = Vec::new();
    let mut call_names: HashMap<&str, &str> = HashMap::new();

    for message in messages {
        match message.role {
            Role::System => system.push(message.content_str()),
            Role::User => contents.push(json!({
                "role": "user",
                "parts": [{ "text": message.content_str() }],
            })),
            Role::Assistant => {
                let mut parts = Vec::new();
                if !message.content_str().is_empty() {
                    parts.push(json!({ "text": message.content_str() }));
                }
                for call in &message.tool_calls {
                    call_names.insert(call.id.as_str(), call.name.as_str());
                    parts.push(json!({
                        "functionCall": { "name": call.name, "args": call.arguments_json() }
                    }));
                }
                if !parts.is_empty() {
                    contents.push(json!({ "role": "model", "parts": parts }));
                }
            }
            Role::Tool => {
                let name = message
                    .tool_call_id
                    .as_deref()
                    .and_then(|id| call_names.get(id).copied())
                    .unwrap_or("unknown");
                contents.push(json!({
                    "role": "function",
                    "parts": [{
                        "functionResponse": {
                            "name": name,
                            "response": { "result": message.content_str() },
                        }
                    }],
                }));
            }
        }
    }

    if contents.is_empty() {
        contents.push(json!({ "role": "user", "parts": [{ "text": "Hello" }] }));
    }
    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, contents)
}

// ==================== Wire types ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    total_token_count: Option<u64>,
}

impl From<UsageMetadata> for Usage {
    fn from(metadata: UsageMetadata) -> Self {
        let mut usage = Usage::new(metadata.prompt_token_count, metadata.candidates_token_count);
        if let Some(total) = metadata.total_token_count {
            usage.total_tokens = total;
        }
        usage
    }
}

impl GenerateResponse {
    fn into_response(self) -> Result<LlmResponse, GatewayError> {
        if let Some(error) = self.error {
            return Err(GatewayError::InvalidResponse(error.message));
        }
        let usage = self.usage_metadata.map(Usage::from).unwrap_or_default();
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(LlmResponse {
                finish_reason: FinishReason::Other("no_candidates".into()),
                usage,
                ..Default::default()
            });
        };

        let mut text = String::new();
        let mut thoughts = Vec::new();
        let mut calls = ToolCallAccumulator::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(call) = part.function_call {
                calls.push_complete(call.id.as_deref(), &call.name, &call.args);
            } else if let Some(part_text) = part.text {
                if part.thought {
                    thoughts.push(part_text);
                } else {
                    text.push_str(&part_text);
                }
            }
        }

        let (inline, visible) = split_reasoning(&text);
        thoughts.extend(inline);
        let tool_calls = calls.finish();
        let finish_reason = if tool_calls.is_empty() {
            candidate
                .finish_reason
                .as_deref()
                .map(FinishReason::from_vendor)
                .unwrap_or_default()
        } else {
            FinishReason::ToolCalls
        };

        Ok(LlmResponse {
            content: Some(visible).filter(|v| !v.is_empty()),
            reasoning: Some(thoughts.join("\n")).filter(|r| !r.trim().is_empty()),
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabha_domain::{ToolCall, ToolDefinition, ToolParameter};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            Client::new(),
            GeminiConfig::new("g-key").with_base_url(server.uri()),
            "gemini-2.0-flash",
        )
    }

    #[test]
    fn test_wire_contents_maps_roles() {
        let call = ToolCall::new("call_1", "search_knowledge").with_arg("query", "churn");
        let messages = vec![
            Message::system("You are the CFO."),
            Message::system("Agenda: pricing"),
            Message::user("User: Go"),
            Message::assistant_with_tools(None, vec![call]),
            Message::tool("call_1", "[1] churn is 3%"),
        ];

        let (system, contents) = wire_contents(&messages);

        assert_eq!(system.as_deref(), Some("You are the CFO.\n\nAgenda: pricing"));
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["query"], "churn");
        assert_eq!(contents[2]["role"], "function");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["name"],
            "search_knowledge"
        );
    }

    #[test]
    fn test_system_only_transcript_gets_greeting() {
        let (_, contents) = wire_contents(&[Message::system("persona")]);
        assert_eq!(contents, vec![json!({"role": "user", "parts": [{"text": "Hello"}]})]);
    }

    #[tokio::test]
    async fn test_complete_parses_thoughts_and_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "You are the CFO."}]},
                "generationConfig": {"maxOutputTokens": 2048},
                "tools": [{"functionDeclarations": [{"name": "log_consensus"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"text": "Runway first.", "thought": true},
                        {"text": "Agreed on runway."},
                        {"functionCall": {"name": "log_consensus", "args": {"topic": "runway"}}}
                    ]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 50, "candidatesTokenCount": 9, "totalTokenCount": 59}
            })))
            .mount(&server)
            .await;

        let request = CompletionRequest::new(vec![
            Message::system("You are the CFO."),
            Message::user("User: Runway?"),
        ])
        .with_tools(vec![
            ToolDefinition::new("log_consensus", "Record agreement")
                .with_parameter(ToolParameter::new("topic", "Topic", true)),
        ]);
        let response = provider(&server).complete(request).await.unwrap();

        assert_eq!(response.text(), "Agreed on runway.");
        assert_eq!(response.reasoning.as_deref(), Some("Runway first."));
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls[0].get_string("topic"), Some("runway"));
        assert_eq!(response.usage, Usage::new(50, 9));
    }

    #[tokio::test]
    async fn test_complete_without_candidates_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let response = provider(&server)
            .complete(CompletionRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap();

        assert!(response.content.is_none());
        assert!(response.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_stream_flushes_after_finish_reason() {
        let sse = [
            r#"data: {"candidates":[{"content":{"parts":[{"text":"Cut ","thought":false}]}}]}"#,
            r#"data: {"candidates":[{"content":{"parts":[{"text":"burn."}]}}]}"#,
            r#"data: {"candidates":[{"content":{"parts":[{"functionCall":{"name":"log_disagreement","args":{"target":"CFO","topic":"burn"}}}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":20,"candidatesTokenCount":4}}"#,
        ]
        .join("\r\n\r\n");
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let events: Vec<StreamEvent> = provider
            .stream(CompletionRequest::new(vec![Message::user("Burn?")]))
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], StreamEvent::text("Cut "));
        assert_eq!(events[1], StreamEvent::text("burn."));
        assert!(
            matches!(&events[2], StreamEvent::ToolCall { call } if call.get_string("target") == Some("CFO"))
        );
        assert_eq!(events[3], StreamEvent::done(Usage::new(20, 4)));
    }

    #[tokio::test]
    async fn test_truncated_stream_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Our CAC is\"}]}}]}\r\n\r\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let events: Vec<StreamEvent> = provider
            .stream(CompletionRequest::new(vec![Message::user("CAC?")]))
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::text("Our CAC is"),
                StreamEvent::error("Gemini stream ended before a finish reason"),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"code": 400, "message": "API key not valid"}})),
            )
            .mount(&server)
            .await;

        let provider = provider(&server);
        let events: Vec<StreamEvent> = provider
            .stream(CompletionRequest::new(vec![Message::user("hi")]))
            .collect()
            .await;

        assert_eq!(events, vec![StreamEvent::error("API error (HTTP 400): API key not valid")]);
    }
}
