//! Tool domain module
//!
//! Tools let a participant act on the meeting during a turn: record a
//! disagreement or a consensus, or pull passages from its knowledge scopes.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolExecutorPort │
//! │ (catalog)    │    │ (invocation) │    │ (application)    │
//! └──────────────┘    └──────────────┘    └──────────────────┘
//! ```
//!
//! - [`ToolSpec`]: ordered catalog offered to the model
//! - [`ToolDefinition`]: name, description, parameter schema
//! - [`ToolCall`]: an invocation with a correlation id
//! - [`ToolValidator`]: pure parameter validation
//! - [`ToolError`]: why a call was rejected

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::ToolError;
