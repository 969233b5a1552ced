//! End Meeting use case
//!
//! Asks every participant whether the meeting should end, applies the quorum
//! rule, and on success closes the meeting with an executive summary.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{CompletionRequest, GatewayError, ProviderFactory};
use crate::ports::meeting_store::{MeetingStore, StoreError};
use crate::ports::progress::{EndMeetingProgress, NoProgress};
use sabha_domain::{
    DomainError, MeetingSnapshot, MeetingStatus, Message, NewMessage, Participant,
    ProviderConfig, ProviderDefaults, PromptTemplate, QuorumRule, Vote, VoteResult,
    parse_end_vote, prompt::VOTE_HISTORY_LIMIT,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Temperature used for vote requests
const VOTE_TEMPERATURE: f32 = 0.3;
/// Temperature used for the executive summary, whatever the writer's own setting
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Errors that can occur while ending a meeting
#[derive(Error, Debug)]
pub enum EndMeetingError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Meeting is {status}, not active")]
    NotActive { status: MeetingStatus },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl EndMeetingError {
    pub fn is_not_found(&self) -> bool {
        match self {
            EndMeetingError::MeetingNotFound(_) => true,
            EndMeetingError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Input for the EndMeeting use case
#[derive(Debug, Clone, PartialEq)]
pub struct EndMeetingInput {
    pub meeting_id: String,
    /// Skip the vote and end immediately
    pub force: bool,
}

impl EndMeetingInput {
    pub fn new(meeting_id: impl Into<String>) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            force: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Outcome of an end-meeting attempt
#[derive(Debug, Clone)]
pub struct EndMeetingOutput {
    pub ended: bool,
    /// One vote per participant, in roster order; empty when forced
    pub votes: Vec<Vote>,
    pub result: Option<VoteResult>,
    pub summary: Option<String>,
    /// Human-readable outcome
    pub message: String,
}

/// Use case for ending a meeting by vote
pub struct EndMeetingUseCase {
    store: Arc<dyn MeetingStore>,
    providers: Arc<dyn ProviderFactory>,
    logger: Arc<dyn ConversationLogger>,
    rule: QuorumRule,
    vote_history: usize,
}

impl EndMeetingUseCase {
    pub fn new(store: Arc<dyn MeetingStore>, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            store,
            providers,
            logger: Arc::new(NoConversationLogger),
            rule: QuorumRule::Majority,
            vote_history: VOTE_HISTORY_LIMIT,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    /// Number of recent messages shown to voters
    pub fn with_vote_history(mut self, messages: usize) -> Self {
        self.vote_history = messages;
        self
    }

    pub async fn execute(&self, input: &EndMeetingInput) -> Result<EndMeetingOutput, EndMeetingError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: &EndMeetingInput,
        progress: &dyn EndMeetingProgress,
    ) -> Result<EndMeetingOutput, EndMeetingError> {
        let snapshot = self
            .store
            .get_snapshot(&input.meeting_id)
            .await?
            .ok_or_else(|| EndMeetingError::MeetingNotFound(input.meeting_id.clone()))?;

        if snapshot.meeting.status != MeetingStatus::Active {
            return Err(EndMeetingError::NotActive {
                status: snapshot.meeting.status,
            });
        }

        let defaults = self.providers.defaults();

        if input.force {
            info!(meeting = %input.meeting_id, "Force-ending meeting");
            let summary = self.close(&snapshot, &defaults, progress).await?;
            return Ok(EndMeetingOutput {
                ended: true,
                votes: Vec::new(),
                result: None,
                summary: Some(summary),
                message: "Meeting ended successfully. Executive summary generated.".to_string(),
            });
        }

        self.store
            .update_status(&input.meeting_id, MeetingStatus::Voting)
            .await?;

        let votes = self.collect_votes(&snapshot, &defaults, progress).await;
        let result = VoteResult::from_votes_with_rule(votes.clone(), &self.rule);
        progress.on_vote_complete(&result);

        info!(
            meeting = %input.meeting_id,
            approvals = result.approve_count,
            total = result.total_votes,
            rule = %self.rule.description(),
            passed = result.passed,
            "End vote tallied {}",
            result.vote_summary()
        );

        if !result.passed {
            self.store
                .update_status(&input.meeting_id, MeetingStatus::Active)
                .await?;
            return Ok(EndMeetingOutput {
                ended: false,
                votes,
                message: result.failure_message(),
                result: Some(result),
                summary: None,
            });
        }

        let summary = self.close(&snapshot, &defaults, progress).await?;
        Ok(EndMeetingOutput {
            ended: true,
            votes,
            result: Some(result),
            summary: Some(summary),
            message: "Meeting ended successfully. Executive summary generated.".to_string(),
        })
    }

    /// Ask each participant in turn. A failed call or unparseable answer is
    /// recorded as a rejection; nobody is dropped from the tally.
    async fn collect_votes(
        &self,
        snapshot: &MeetingSnapshot,
        defaults: &ProviderDefaults,
        progress: &dyn EndMeetingProgress,
    ) -> Vec<Vote> {
        let digest = PromptTemplate::vote_digest(&snapshot.messages, self.vote_history);
        progress.on_vote_start(snapshot.participants.len());

        let mut votes = Vec::with_capacity(snapshot.participants.len());
        for participant in &snapshot.participants {
            progress.on_vote_requested(participant);
            let vote = match self
                .request_vote(participant, &digest, &snapshot.meeting.agenda, defaults)
                .await
            {
                Ok(answer) => {
                    let parsed = parse_end_vote(&answer);
                    let reason = if parsed.reason.trim().is_empty() {
                        "No reason provided".to_string()
                    } else {
                        parsed.reason
                    };
                    Vote::new(&participant.id, &participant.name, parsed.approved, reason)
                }
                Err(e) => {
                    warn!(participant = %participant.name, error = %e, "Vote request failed");
                    Vote::reject(
                        &participant.id,
                        &participant.name,
                        format!("Error getting vote: {}", e),
                    )
                }
            };

            debug!(participant = %vote.participant_name, approved = vote.approved, "Vote cast");
            self.logger.log(ConversationEvent::new(
                "vote_cast",
                json!({
                    "meeting_id": snapshot.meeting.id,
                    "participant": vote.participant_name,
                    "approved": vote.approved,
                    "reason": vote.reason,
                }),
            ));
            progress.on_vote_cast(&vote);
            votes.push(vote);
        }
        votes
    }

    async fn request_vote(
        &self,
        participant: &Participant,
        digest: &str,
        agenda: &str,
        defaults: &ProviderDefaults,
    ) -> Result<String, EndMeetingError> {
        let config = participant.provider_config.resolve(defaults)?;
        let provider = self.providers.create(&config)?;
        let request = CompletionRequest::new(vec![Message::user(PromptTemplate::end_vote(
            participant,
            digest,
            agenda,
        ))])
        .with_temperature(VOTE_TEMPERATURE)
        .with_max_tokens(config.max_tokens);

        let response = provider.complete(request).await?;
        Ok(response.text().to_string())
    }

    /// Generate and persist the executive summary, then mark the meeting
    /// ended. Any failure reverts the meeting to active before propagating.
    async fn close(
        &self,
        snapshot: &MeetingSnapshot,
        defaults: &ProviderDefaults,
        progress: &dyn EndMeetingProgress,
    ) -> Result<String, EndMeetingError> {
        progress.on_summary_start();
        match self.summarize_and_persist(snapshot, defaults).await {
            Ok(summary) => {
                self.store
                    .update_status(&snapshot.meeting.id, MeetingStatus::Ended)
                    .await?;
                info!(meeting = %snapshot.meeting.id, "Meeting ended");
                Ok(summary)
            }
            Err(e) => {
                warn!(meeting = %snapshot.meeting.id, error = %e, "Closing meeting failed, reverting to active");
                if let Err(revert) = self
                    .store
                    .update_status(&snapshot.meeting.id, MeetingStatus::Active)
                    .await
                {
                    warn!(error = %revert, "Could not revert meeting status");
                }
                Err(e)
            }
        }
    }

    async fn summarize_and_persist(
        &self,
        snapshot: &MeetingSnapshot,
        defaults: &ProviderDefaults,
    ) -> Result<String, EndMeetingError> {
        // The first participant's provider writes the summary
        let config = snapshot
            .participants
            .first()
            .map(|p| p.provider_config.clone())
            .unwrap_or_else(ProviderConfig::default)
            .resolve(defaults)?;
        let provider = self.providers.create(&config)?;

        let prompt = PromptTemplate::executive_summary(
            &snapshot.meeting.name,
            &snapshot.meeting.agenda,
            &snapshot.participants,
            &snapshot.messages,
        );
        let request = CompletionRequest::new(vec![Message::user(prompt)])
            .with_temperature(SUMMARY_TEMPERATURE)
            .with_max_tokens(config.max_tokens);

        let response = provider.complete(request).await?;
        let summary = response.text().to_string();
        let cost = provider.estimate_cost(&response.usage);

        self.store
            .append_message(
                &snapshot.meeting.id,
                NewMessage::system(PromptTemplate::meeting_ended(&summary)).with_cost(cost),
            )
            .await?;
        if cost > 0.0 {
            self.store.increment_cost(&snapshot.meeting.id, cost).await?;
        }

        Ok(summary)
    }
}
