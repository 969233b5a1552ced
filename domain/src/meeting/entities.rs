//! Meeting aggregate: the meeting, its participants and its transcript.

use crate::provider::ProviderConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    #[default]
    Active,
    /// An end vote is in progress
    Voting,
    Ended,
    Archived,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Active => "active",
            MeetingStatus::Voting => "voting",
            MeetingStatus::Ended => "ended",
            MeetingStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who wrote a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    /// The human moderator
    User,
    /// An AI participant
    Ai,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub name: String,
    pub agenda: String,
    pub status: MeetingStatus,
    /// Accumulated estimated spend in USD
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
}

/// An AI persona taking part in a meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub meeting_id: String,
    pub name: String,
    pub role: String,
    pub system_prompt: String,
    #[serde(default)]
    pub provider_config: ProviderConfig,
}

/// A participant about to be seated; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewParticipant {
    pub name: String,
    pub role: String,
    pub system_prompt: String,
    pub provider_config: ProviderConfig,
}

impl NewParticipant {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            system_prompt: system_prompt.into(),
            provider_config: ProviderConfig::default(),
        }
    }

    pub fn with_provider_config(mut self, config: ProviderConfig) -> Self {
        self.provider_config = config;
        self
    }
}

/// A passage an answer drew on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Document id the passage came from
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Narration of one tool execution, kept with the message that caused it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolArtifact {
    pub tool: String,
    pub result: String,
}

/// A persisted transcript message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingMessage {
    pub id: String,
    pub meeting_id: String,
    pub sender_type: SenderType,
    /// Participant id for AI messages
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_artifacts: Vec<ToolArtifact>,
    #[serde(default)]
    pub estimated_cost: f64,
    pub created_at: DateTime<Utc>,
}

/// A message about to be appended; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub sender_type: SenderType,
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub content: String,
    pub thinking: Option<String>,
    pub citations: Vec<Citation>,
    pub tool_artifacts: Vec<ToolArtifact>,
    pub estimated_cost: f64,
}

impl NewMessage {
    fn base(sender_type: SenderType, sender_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_type,
            sender_id: None,
            sender_name: sender_name.into(),
            content: content.into(),
            thinking: None,
            citations: Vec::new(),
            tool_artifacts: Vec::new(),
            estimated_cost: 0.0,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::base(SenderType::User, "User", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::base(SenderType::System, "System", content)
    }

    pub fn ai(participant: &Participant, content: impl Into<String>) -> Self {
        let mut msg = Self::base(SenderType::Ai, participant.name.clone(), content);
        msg.sender_id = Some(participant.id.clone());
        msg
    }

    pub fn with_thinking(mut self, thinking: Option<String>) -> Self {
        self.thinking = thinking.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn with_tool_artifacts(mut self, artifacts: Vec<ToolArtifact>) -> Self {
        self.tool_artifacts = artifacts;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = cost;
        self
    }
}

/// Lifecycle of a disagreement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisagreementStatus {
    #[default]
    Open,
    Resolved,
    Conceded,
}

/// Disagreement logged by one participant against another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disagreement {
    pub id: String,
    pub meeting_id: String,
    pub source_participant_id: String,
    pub target_name: String,
    pub topic: String,
    pub reasoning: String,
    /// 1 (mild) to 5 (fundamental)
    pub severity: u8,
    pub status: DisagreementStatus,
    pub created_at: DateTime<Utc>,
}

/// Agreement logged among participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub id: String,
    pub meeting_id: String,
    pub participants: Vec<String>,
    pub topic: String,
    /// 1 (tentative) to 5 (unanimous and firm)
    pub strength: u8,
    pub created_at: DateTime<Utc>,
}

/// Unpersisted disagreement produced by a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct NewDisagreement {
    pub source_participant_id: String,
    pub target_name: String,
    pub topic: String,
    pub reasoning: String,
    pub severity: u8,
}

/// Unpersisted consensus produced by a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct NewConsensus {
    pub participants: Vec<String>,
    pub topic: String,
    pub strength: u8,
}

/// Meeting with its participants and ordered transcript
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSnapshot {
    pub meeting: Meeting,
    pub participants: Vec<Participant>,
    pub messages: Vec<MeetingMessage>,
}

impl MeetingSnapshot {
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant() -> Participant {
        Participant {
            id: "p1".into(),
            meeting_id: "m1".into(),
            name: "CTO".into(),
            role: "Chief Technology Officer".into(),
            system_prompt: "You are the CTO.".into(),
            provider_config: ProviderConfig::default(),
        }
    }

    #[test]
    fn test_ai_message_is_attributed() {
        let msg = NewMessage::ai(&participant(), "hello").with_cost(0.01);
        assert_eq!(msg.sender_type, SenderType::Ai);
        assert_eq!(msg.sender_id.as_deref(), Some("p1"));
        assert_eq!(msg.sender_name, "CTO");
        assert_eq!(msg.estimated_cost, 0.01);
    }

    #[test]
    fn test_blank_thinking_dropped() {
        let msg = NewMessage::user("hi").with_thinking(Some("  ".into()));
        assert!(msg.thinking.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&MeetingStatus::Voting).unwrap(), "\"voting\"");
        assert_eq!(MeetingStatus::Ended.to_string(), "ended");
    }
}
