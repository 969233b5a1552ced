//! Meeting store port
//!
//! Persistence of meetings, participants, transcript messages and the
//! disagreement/consensus records written by tools.

use async_trait::async_trait;
use sabha_domain::{
    Consensus, Disagreement, Meeting, MeetingMessage, MeetingSnapshot, MeetingStatus,
    NewConsensus, NewDisagreement, NewMessage, NewParticipant, Participant,
};
use thiserror::Error;

/// Errors raised by a meeting store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::MeetingNotFound(_) | StoreError::ParticipantNotFound(_)
        )
    }
}

#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn create_meeting(&self, name: &str, agenda: &str) -> Result<Meeting, StoreError>;

    async fn add_participant(
        &self,
        meeting_id: &str,
        participant: NewParticipant,
    ) -> Result<Participant, StoreError>;

    /// Meeting with participants (seating order) and messages (chronological).
    ///
    /// Returns `Ok(None)` when the meeting does not exist.
    async fn get_snapshot(&self, meeting_id: &str) -> Result<Option<MeetingSnapshot>, StoreError>;

    async fn append_message(
        &self,
        meeting_id: &str,
        message: NewMessage,
    ) -> Result<MeetingMessage, StoreError>;

    /// Add `amount` USD to the meeting's running cost
    async fn increment_cost(&self, meeting_id: &str, amount: f64) -> Result<(), StoreError>;

    async fn update_status(&self, meeting_id: &str, status: MeetingStatus) -> Result<(), StoreError>;

    async fn save_disagreement(
        &self,
        meeting_id: &str,
        disagreement: NewDisagreement,
    ) -> Result<Disagreement, StoreError>;

    async fn save_consensus(
        &self,
        meeting_id: &str,
        consensus: NewConsensus,
    ) -> Result<Consensus, StoreError>;

    async fn list_disagreements(&self, meeting_id: &str) -> Result<Vec<Disagreement>, StoreError>;

    async fn list_consensus(&self, meeting_id: &str) -> Result<Vec<Consensus>, StoreError>;
}
