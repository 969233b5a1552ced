//! Progress notification port
//!
//! Callbacks for reporting end-meeting progress. Implementations live in the
//! presentation layer (console spinner, etc.).

use sabha_domain::{Participant, Vote, VoteResult};

pub trait EndMeetingProgress: Send + Sync {
    /// Voting is about to start
    fn on_vote_start(&self, _total_participants: usize) {}

    /// A participant is being asked for a vote
    fn on_vote_requested(&self, _participant: &Participant) {}

    fn on_vote_cast(&self, _vote: &Vote) {}

    fn on_vote_complete(&self, _result: &VoteResult) {}

    /// The executive summary is being generated
    fn on_summary_start(&self) {}
}

/// No-op progress notifier
pub struct NoProgress;

impl EndMeetingProgress for NoProgress {}
