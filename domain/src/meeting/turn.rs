//! Turn phases and outcomes

use super::entities::{Consensus, Disagreement, MeetingMessage};

/// Phase of a single participant turn, as traced by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    ContextBuilt,
    AwaitingCompletion,
    ToolRound,
    Persisted,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::ContextBuilt => "context_built",
            TurnPhase::AwaitingCompletion => "awaiting_completion",
            TurnPhase::ToolRound => "tool_round",
            TurnPhase::Persisted => "persisted",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub message: MeetingMessage,
    pub disagreements: Vec<Disagreement>,
    pub consensus: Vec<Consensus>,
}

/// Content persisted when a turn only fired tools
pub fn tool_only_placeholder<'a>(
    participant_name: &str,
    tool_names: impl IntoIterator<Item = &'a str>,
) -> String {
    let names: Vec<&str> = tool_names.into_iter().collect();
    format!("[{} used tools: {}]", participant_name, names.join(", "))
}
