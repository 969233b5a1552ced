//! Tool Executor port
//!
//! Defines how the turn orchestrator executes the tools a participant requested.

use async_trait::async_trait;
use sabha_domain::{Citation, NewConsensus, NewDisagreement, ToolCall, ToolDefinition, ToolSpec};

/// Who is calling a tool, and in which meeting
#[derive(Debug, Clone, PartialEq)]
pub struct ToolContext {
    pub meeting_id: String,
    pub participant_id: String,
    pub participant_name: String,
}

/// Result of one tool execution.
///
/// `output` is the text fed back as the tool result. Records requested by
/// the tool are drafts: the turn saves them together with its message, so
/// a turn that fails or is cancelled leaves no records behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutcome {
    pub output: String,
    pub disagreement: Option<NewDisagreement>,
    pub consensus: Option<NewConsensus>,
    pub citations: Vec<Citation>,
}

impl ToolOutcome {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }
}

/// Port for tool execution
///
/// Execution is infallible from the caller's side: every failure inside a
/// tool becomes a diagnostic `output`.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Catalog offered to participants
    fn tool_spec(&self) -> &ToolSpec;

    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Definitions to send with a completion request
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tool_spec().to_definitions()
    }

    async fn execute(&self, call: &ToolCall, context: &ToolContext) -> ToolOutcome;
}
