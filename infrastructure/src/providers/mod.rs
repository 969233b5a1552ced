//! LLM provider adapters
//!
//! Each adapter maps the unified [`CompletionRequest`](sabha_application::CompletionRequest)
//! onto one vendor wire format and normalizes the answer back into
//! [`LlmResponse`](sabha_domain::LlmResponse) or a stream of
//! [`StreamEvent`]s.

pub mod gemini;
pub mod ollama;
pub mod openrouter;
pub mod registry;
pub mod stream_decode;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};
pub use registry::{ProviderRegistry, ProviderSettings};

use reqwest::Response;
use sabha_application::GatewayError;
use sabha_domain::{Segment, StreamEvent, split_reasoning};
use serde_json::Value;

/// Map a transport failure onto the gateway taxonomy
pub(crate) fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::Connection(e.to_string())
    } else {
        GatewayError::Other(e.to_string())
    }
}

/// Pass a successful response through; turn anything else into `Api`.
pub(crate) async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Best-effort extraction of a vendor error message.
///
/// Handles `{"error": {"message": ...}}`, `{"error": "..."}` and plain text.
pub(crate) fn api_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match &json["error"] {
            Value::String(message) => return message.clone(),
            Value::Object(error) => {
                if let Some(message) = error.get("message").and_then(Value::as_str) {
                    return message.to_string();
                }
            }
            _ => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty error body".to_string()
    } else {
        sabha_domain::truncate_chars(trimmed, 500)
    }
}

/// Separate inline `<think>` reasoning from content unless the wire already
/// carried reasoning in its own field.
pub(crate) fn normalize_reasoning(
    content: Option<String>,
    reasoning: Option<String>,
) -> (Option<String>, Option<String>) {
    let reasoning = reasoning.filter(|r| !r.trim().is_empty());
    match content {
        Some(text) if text.contains("<think>") => {
            let (inline, visible) = split_reasoning(&text);
            let reasoning = match (reasoning, inline) {
                (Some(wire), Some(inline)) => Some(format!("{}\n{}", wire, inline)),
                (wire, inline) => wire.or(inline),
            };
            (Some(visible).filter(|v| !v.is_empty()), reasoning)
        }
        content => (content.filter(|c| !c.is_empty()), reasoning),
    }
}

/// Stream events for splitter output, skipping empty fragments
pub(crate) fn segment_events(segments: Vec<Segment>) -> Vec<StreamEvent> {
    segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) if !text.is_empty() => Some(StreamEvent::text(text)),
            Segment::Reasoning(text) if !text.is_empty() => Some(StreamEvent::reasoning(text)),
            _ => None,
        })
        .collect()
}
