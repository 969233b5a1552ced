//! Assembly of tool calls from streamed fragments.
//!
//! OpenAI-style streams deliver a tool call as a series of deltas keyed by
//! `index`: the id and name usually arrive first, the JSON arguments as string
//! fragments afterwards. Other vendors deliver whole calls. Both feed the same
//! accumulator, which is created per stream and consumed by [`finish`].
//!
//! [`finish`]: ToolCallAccumulator::finish

use crate::tool::entities::ToolCall;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<usize, PartialCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one delta into the call at `index`.
    pub fn push_delta(
        &mut self,
        index: usize,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) {
        let call = self.calls.entry(index).or_default();
        if let Some(id) = id.filter(|s| !s.is_empty()) {
            call.id = Some(id.to_string());
        }
        if let Some(name) = name {
            call.name.push_str(name);
        }
        if let Some(fragment) = arguments {
            call.arguments.push_str(fragment);
        }
    }

    /// Record a call that arrived whole; arguments may be an object or a
    /// JSON-encoded string.
    pub fn push_complete(&mut self, id: Option<&str>, name: &str, arguments: &Value) {
        let index = self.calls.keys().next_back().map_or(0, |last| last + 1);
        let encoded = match arguments {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        self.push_delta(index, id, Some(name), Some(&encoded));
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drain the accumulated calls in index order.
    ///
    /// Malformed argument JSON degrades to an empty object; a missing id
    /// becomes `call_{index}`.
    pub fn finish(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.calls)
            .into_iter()
            .map(|(index, partial)| {
                let id = partial.id.unwrap_or_else(|| format!("call_{}", index));
                ToolCall::from_value(id, partial.name, parse_arguments(&partial.arguments))
            })
            .collect()
    }
}

/// Parse a tool-argument payload leniently.
pub fn parse_arguments(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Value::Object(map),
        // Some models double-encode the arguments object.
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => Value::Object(Default::default()),
        },
        _ => Value::Object(Default::default()),
    }
}
