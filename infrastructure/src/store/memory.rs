//! In-memory meeting store
//!
//! Holds everything behind a single `tokio::sync::RwLock`. Participants keep
//! their seating order and messages their append order, which is what the
//! orchestrator and voter rely on.

use async_trait::async_trait;
use chrono::Utc;
use sabha_application::{MeetingStore, StoreError};
use sabha_domain::{
    Consensus, Disagreement, DisagreementStatus, Meeting, MeetingMessage, MeetingSnapshot,
    MeetingStatus, NewConsensus, NewDisagreement, NewMessage, NewParticipant, Participant,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct State {
    meetings: HashMap<String, Meeting>,
    participants: Vec<Participant>,
    messages: Vec<MeetingMessage>,
    disagreements: Vec<Disagreement>,
    consensus: Vec<Consensus>,
}

impl State {
    fn meeting_mut(&mut self, meeting_id: &str) -> Result<&mut Meeting, StoreError> {
        self.meetings
            .get_mut(meeting_id)
            .ok_or_else(|| StoreError::MeetingNotFound(meeting_id.to_string()))
    }

    fn require_meeting(&self, meeting_id: &str) -> Result<(), StoreError> {
        if self.meetings.contains_key(meeting_id) {
            Ok(())
        } else {
            Err(StoreError::MeetingNotFound(meeting_id.to_string()))
        }
    }
}

#[derive(Default)]
pub struct InMemoryMeetingStore {
    state: RwLock<State>,
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl MeetingStore for InMemoryMeetingStore {
    async fn create_meeting(&self, name: &str, agenda: &str) -> Result<Meeting, StoreError> {
        let meeting = Meeting {
            id: new_id(),
            name: name.to_string(),
            agenda: agenda.to_string(),
            status: MeetingStatus::Active,
            total_cost: 0.0,
            created_at: Utc::now(),
        };
        debug!(meeting_id = %meeting.id, name, "Meeting created");
        self.state
            .write()
            .await
            .meetings
            .insert(meeting.id.clone(), meeting.clone());
        Ok(meeting)
    }

    async fn add_participant(
        &self,
        meeting_id: &str,
        participant: NewParticipant,
    ) -> Result<Participant, StoreError> {
        let mut state = self.state.write().await;
        state.require_meeting(meeting_id)?;
        let participant = Participant {
            id: new_id(),
            meeting_id: meeting_id.to_string(),
            name: participant.name,
            role: participant.role,
            system_prompt: participant.system_prompt,
            provider_config: participant.provider_config,
        };
        state.participants.push(participant.clone());
        Ok(participant)
    }

    async fn get_snapshot(&self, meeting_id: &str) -> Result<Option<MeetingSnapshot>, StoreError> {
        let state = self.state.read().await;
        Ok(state.meetings.get(meeting_id).map(|meeting| MeetingSnapshot {
            meeting: meeting.clone(),
            participants: state
                .participants
                .iter()
                .filter(|p| p.meeting_id == meeting_id)
                .cloned()
                .collect(),
            messages: state
                .messages
                .iter()
                .filter(|m| m.meeting_id == meeting_id)
                .cloned()
                .collect(),
        }))
    }

    async fn append_message(
        &self,
        meeting_id: &str,
        message: NewMessage,
    ) -> Result<MeetingMessage, StoreError> {
        let mut state = self.state.write().await;
        state.require_meeting(meeting_id)?;
        let saved = MeetingMessage {
            id: new_id(),
            meeting_id: meeting_id.to_string(),
            sender_type: message.sender_type,
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            content: message.content,
            thinking: message.thinking,
            citations: message.citations,
            tool_artifacts: message.tool_artifacts,
            estimated_cost: message.estimated_cost,
            created_at: Utc::now(),
        };
        state.messages.push(saved.clone());
        Ok(saved)
    }

    async fn increment_cost(&self, meeting_id: &str, amount: f64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.meeting_mut(meeting_id)?.total_cost += amount;
        Ok(())
    }

    async fn update_status(&self, meeting_id: &str, status: MeetingStatus) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let meeting = state.meeting_mut(meeting_id)?;
        debug!(meeting_id, from = %meeting.status, to = %status, "Meeting status changed");
        meeting.status = status;
        Ok(())
    }

    async fn save_disagreement(
        &self,
        meeting_id: &str,
        disagreement: NewDisagreement,
    ) -> Result<Disagreement, StoreError> {
        let mut state = self.state.write().await;
        state.require_meeting(meeting_id)?;
        let saved = Disagreement {
            id: new_id(),
            meeting_id: meeting_id.to_string(),
            source_participant_id: disagreement.source_participant_id,
            target_name: disagreement.target_name,
            topic: disagreement.topic,
            reasoning: disagreement.reasoning,
            severity: disagreement.severity,
            status: DisagreementStatus::Open,
            created_at: Utc::now(),
        };
        state.disagreements.push(saved.clone());
        Ok(saved)
    }

    async fn save_consensus(
        &self,
        meeting_id: &str,
        consensus: NewConsensus,
    ) -> Result<Consensus, StoreError> {
        let mut state = self.state.write().await;
        state.require_meeting(meeting_id)?;
        let saved = Consensus {
            id: new_id(),
            meeting_id: meeting_id.to_string(),
            participants: consensus.participants,
            topic: consensus.topic,
            strength: consensus.strength,
            created_at: Utc::now(),
        };
        state.consensus.push(saved.clone());
        Ok(saved)
    }

    async fn list_disagreements(&self, meeting_id: &str) -> Result<Vec<Disagreement>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .disagreements
            .iter()
            .filter(|d| d.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn list_consensus(&self, meeting_id: &str) -> Result<Vec<Consensus>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .consensus
            .iter()
            .filter(|c| c.meeting_id == meeting_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_keeps_order() {
        let store = InMemoryMeetingStore::new();
        let meeting = store.create_meeting("Board", "Pricing").await.unwrap();
        let other = store.create_meeting("Other", "").await.unwrap();

        let cto = store
            .add_participant(&meeting.id, NewParticipant::new("CTO", "Tech", "You are the CTO."))
            .await
            .unwrap();
        store
            .add_participant(&meeting.id, NewParticipant::new("CFO", "Finance", "You are the CFO."))
            .await
            .unwrap();
        store.append_message(&meeting.id, NewMessage::user("first")).await.unwrap();
        store.append_message(&other.id, NewMessage::user("elsewhere")).await.unwrap();
        store.append_message(&meeting.id, NewMessage::ai(&cto, "second")).await.unwrap();

        let snapshot = store.get_snapshot(&meeting.id).await.unwrap().unwrap();
        let names: Vec<_> = snapshot.participants.iter().map(|p| p.name.as_str()).collect();
        let contents: Vec<_> = snapshot.messages.iter().map(|m| m.content.as_str()).collect();

        assert_eq!(names, vec!["CTO", "CFO"]);
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(snapshot.messages[1].sender_id.as_deref(), Some(cto.id.as_str()));
    }

    #[tokio::test]
    async fn test_cost_and_status() {
        let store = InMemoryMeetingStore::new();
        let meeting = store.create_meeting("Board", "").await.unwrap();

        store.increment_cost(&meeting.id, 0.25).await.unwrap();
        store.increment_cost(&meeting.id, 0.5).await.unwrap();
        store.update_status(&meeting.id, MeetingStatus::Ended).await.unwrap();

        let snapshot = store.get_snapshot(&meeting.id).await.unwrap().unwrap();
        assert!((snapshot.meeting.total_cost - 0.75).abs() < 1e-9);
        assert_eq!(snapshot.meeting.status, MeetingStatus::Ended);
    }

    #[tokio::test]
    async fn test_missing_meeting() {
        let store = InMemoryMeetingStore::new();

        assert!(store.get_snapshot("nope").await.unwrap().is_none());
        let err = store.append_message("nope", NewMessage::user("x")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.increment_cost("nope", 1.0).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_meeting() {
        let store = InMemoryMeetingStore::new();
        let meeting = store.create_meeting("Board", "").await.unwrap();

        let saved = store
            .save_disagreement(
                &meeting.id,
                NewDisagreement {
                    source_participant_id: "p1".into(),
                    target_name: "CFO".into(),
                    topic: "burn".into(),
                    reasoning: "too fast".into(),
                    severity: 4,
                },
            )
            .await
            .unwrap();
        store
            .save_consensus(
                &meeting.id,
                NewConsensus {
                    participants: vec!["CTO".into(), "CFO".into()],
                    topic: "hiring freeze".into(),
                    strength: 5,
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.status, DisagreementStatus::Open);
        assert_eq!(store.list_disagreements(&meeting.id).await.unwrap(), vec![saved]);
        assert_eq!(store.list_consensus(&meeting.id).await.unwrap().len(), 1);
        assert!(store.list_consensus("other").await.unwrap().is_empty());
    }
}
