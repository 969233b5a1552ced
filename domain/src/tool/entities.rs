//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

/// JSON Schema type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// Array of strings
    Array,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
        }
    }

    /// Whether `value` has this JSON type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
        }
    }
}

/// Definition of a tool offered to a participant during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "log_consensus")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Parameter specifications, in schema order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub param_type: ParamType,
    /// Inclusive lower bound for integer parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Inclusive upper bound for integer parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Render the parameters as a JSON Schema object.
    ///
    /// Every provider wire format accepts this shape, either directly
    /// (`parameters` on OpenAI-style APIs) or nested in a function declaration.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(param.param_type.as_str()));
            prop.insert("description".into(), json!(param.description));
            if param.param_type == ParamType::Array {
                prop.insert("items".into(), json!({ "type": "string" }));
            }
            if let Some(min) = param.minimum {
                prop.insert("minimum".into(), json!(min));
            }
            if let Some(max) = param.maximum {
                prop.insert("maximum".into(), json!(max));
            }
            properties.insert(param.name.clone(), Value::Object(prop));
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
            minimum: None,
            maximum: None,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_range(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }
}

/// Ordered catalog of tools offered to a participant
///
/// Registration order is preserved because it is the order the tools are
/// presented to the model.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: Vec<ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any earlier definition with the same name
    pub fn register(mut self, tool: ToolDefinition) -> Self {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions as an owned list, in registration order
    pub fn to_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.clone()
    }
}

/// A tool invocation requested by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id; tool-result messages echo it back
    pub id: String,
    pub name: String,
    pub arguments: HashMap<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Build from a JSON value, keeping only object arguments.
    ///
    /// Anything other than an object degrades to an empty argument map.
    pub fn from_value(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Arguments as a JSON object value
    pub fn arguments_json(&self) -> Value {
        Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required, non-blank string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Integer argument, accepting numeric strings as well
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.arguments.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String-array argument; non-string items are skipped
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.arguments.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating_tool() -> ToolDefinition {
        ToolDefinition::new("rate", "Rate something")
            .with_parameter(ToolParameter::new("topic", "What is rated", true))
            .with_parameter(
                ToolParameter::new("score", "1-5", false)
                    .with_type(ParamType::Integer)
                    .with_range(1, 5),
            )
            .with_parameter(
                ToolParameter::new("names", "Who agreed", false).with_type(ParamType::Array),
            )
    }

    #[test]
    fn test_parameters_schema() {
        let schema = rating_tool().parameters_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["score"]["type"], "integer");
        assert_eq!(schema["properties"]["score"]["maximum"], 5);
        assert_eq!(schema["properties"]["names"]["items"]["type"], "string");
        assert_eq!(schema["required"], json!(["topic"]));
    }

    #[test]
    fn test_definitions_compare_by_value() {
        assert_eq!(rating_tool(), rating_tool());

        let loosened = ToolDefinition::new("rate", "Rate something")
            .with_parameter(ToolParameter::new("topic", "What is rated", false));
        assert_ne!(rating_tool(), loosened);
    }

    #[test]
    fn test_tool_spec_preserves_order() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("b", "second"))
            .register(ToolDefinition::new("a", "first"));

        assert_eq!(spec.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(spec.get("a").is_some());
        assert!(spec.get("missing").is_none());
    }

    #[test]
    fn test_tool_spec_register_replaces() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("a", "old"))
            .register(ToolDefinition::new("a", "new"));

        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get("a").unwrap().description, "new");
    }

    #[test]
    fn test_tool_call_from_non_object_degrades() {
        let call = ToolCall::from_value("call_0", "rate", json!("not an object"));
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_tool_call_accessors() {
        let call = ToolCall::new("id1", "rate")
            .with_arg("topic", "pricing")
            .with_arg("score", "4")
            .with_arg("names", json!(["CTO", 3, "Analyst"]));

        assert_eq!(call.require_string("topic").unwrap(), "pricing");
        assert!(call.require_string("missing").is_err());
        assert_eq!(call.get_i64("score"), Some(4));
        assert_eq!(call.get_string_list("names"), vec!["CTO", "Analyst"]);
    }

    #[test]
    fn test_blank_required_string_is_missing() {
        let call = ToolCall::new("id1", "rate").with_arg("topic", "   ");
        assert!(call.require_string("topic").is_err());
    }
}
