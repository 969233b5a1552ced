//! Streaming events shared by every provider adapter and the turn orchestrator.
//!
//! A stream is an ordered sequence of [`StreamEvent`]s that ends with exactly
//! one terminal event: [`Done`](StreamEvent::Done) or [`Error`](StreamEvent::Error).
//! Adapters emit the first five variants; the orchestrator adds
//! [`ToolResult`](StreamEvent::ToolResult) and [`Citation`](StreamEvent::Citation)
//! when it re-emits a turn to the caller.

use super::response::Usage;
use crate::meeting::entities::Citation;
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of visible answer text.
    TextDelta { text: String },
    /// A fragment of reasoning ("thinking") text.
    ReasoningDelta { text: String },
    /// A fully accumulated tool call.
    ToolCall { call: ToolCall },
    /// Output of an executed tool.
    ToolResult {
        call_id: String,
        tool_name: String,
        output: String,
    },
    /// A knowledge passage the answer drew on.
    Citation { citation: Citation },
    /// Successful end of stream.
    Done {
        usage: Usage,
        /// Id of the persisted message, set by the orchestrator
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    /// Failed end of stream.
    Error { message: String },
}

impl StreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        StreamEvent::TextDelta { text: text.into() }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        StreamEvent::ReasoningDelta { text: text.into() }
    }

    pub fn done(usage: Usage) -> Self {
        StreamEvent::Done {
            usage,
            message_id: None,
        }
    }

    /// `Done` carrying the id of the message the turn persisted
    pub fn done_with_message(usage: Usage, message_id: impl Into<String>) -> Self {
        StreamEvent::Done {
            usage,
            message_id: Some(message_id.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }
}
