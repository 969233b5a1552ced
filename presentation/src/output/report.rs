//! Serializable record of a finished meeting

use sabha_application::EndMeetingOutput;
use sabha_domain::{Consensus, Disagreement, Meeting, MeetingMessage, MeetingSnapshot, Participant, VoteResult};
use serde::Serialize;

/// Everything a meeting produced, in a shape suitable for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct MeetingReport {
    pub meeting: Meeting,
    pub participants: Vec<Participant>,
    pub messages: Vec<MeetingMessage>,
    pub disagreements: Vec<Disagreement>,
    pub consensus: Vec<Consensus>,
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<VoteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl MeetingReport {
    pub fn new(
        snapshot: MeetingSnapshot,
        disagreements: Vec<Disagreement>,
        consensus: Vec<Consensus>,
    ) -> Self {
        Self {
            meeting: snapshot.meeting,
            participants: snapshot.participants,
            messages: snapshot.messages,
            disagreements,
            consensus,
            ended: false,
            vote: None,
            summary: None,
        }
    }

    pub fn with_end(mut self, outcome: &EndMeetingOutput) -> Self {
        self.ended = outcome.ended;
        self.vote = outcome.result.clone();
        self.summary = outcome.summary.clone();
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
