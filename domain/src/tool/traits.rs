//! Tool domain traits
//!
//! Pure validation of tool calls against their definitions. Execution lives
//! behind the `ToolExecutorPort` in the application layer.

use super::entities::{ParamType, ToolCall, ToolDefinition};
use super::value_objects::ToolError;

/// Validator for tool calls
pub trait ToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError>;
}

/// Checks required parameters, JSON types and integer ranges.
///
/// Unknown extra arguments are tolerated: models frequently add fields and
/// rejecting the whole call for that would discard a usable request.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError> {
        for param in &definition.parameters {
            let Some(value) = call.arguments.get(&param.name).filter(|v| !v.is_null()) else {
                if param.required {
                    return Err(ToolError::invalid_argument(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    )));
                }
                continue;
            };

            if param.param_type == ParamType::Integer {
                let Some(n) = call.get_i64(&param.name) else {
                    return Err(ToolError::invalid_argument(format!(
                        "Parameter '{}' must be an integer",
                        param.name
                    )));
                };
                if param.minimum.is_some_and(|min| n < min)
                    || param.maximum.is_some_and(|max| n > max)
                {
                    return Err(ToolError::invalid_argument(format!(
                        "Parameter '{}' must be between {} and {} (got {})",
                        param.name,
                        param.minimum.unwrap_or(i64::MIN),
                        param.maximum.unwrap_or(i64::MAX),
                        n
                    )));
                }
                continue;
            }

            // Comma-separated strings are accepted where arrays are expected.
            let lenient_array = param.param_type == ParamType::Array && value.is_string();
            if !param.param_type.accepts(value) && !lenient_array {
                return Err(ToolError::invalid_argument(format!(
                    "Parameter '{}' must be of type {}",
                    param.name,
                    param.param_type.as_str()
                )));
            }
        }

        Ok(())
    }
}
