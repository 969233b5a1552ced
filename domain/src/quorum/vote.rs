//! End-meeting votes and their tally.

use super::rule::QuorumRule;
use serde::{Deserialize, Serialize};

/// One participant's vote on ending the meeting.
///
/// A participant whose answer could not be obtained or parsed still gets a
/// vote: `approved = false` with a diagnostic reason.
///
/// ```
/// use sabha_domain::quorum::Vote;
///
/// let vote = Vote::approve("p1", "The CTO", "Agenda covered.");
/// assert!(vote.approved);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub participant_id: String,
    pub participant_name: String,
    pub approved: bool,
    pub reason: String,
}

impl Vote {
    pub fn new(
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        approved: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
            approved,
            reason: reason.into(),
        }
    }

    pub fn approve(
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(participant_id, participant_name, true, reason)
    }

    pub fn reject(
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(participant_id, participant_name, false, reason)
    }
}

/// Tally of an end-meeting vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteResult {
    pub passed: bool,
    pub approve_count: usize,
    pub total_votes: usize,
    pub votes: Vec<Vote>,
}

impl VoteResult {
    pub fn from_votes_with_rule(votes: Vec<Vote>, rule: &QuorumRule) -> Self {
        let approve_count = votes.iter().filter(|v| v.approved).count();
        let total_votes = votes.len();

        Self {
            passed: rule.is_satisfied(approve_count, total_votes),
            approve_count,
            total_votes,
            votes,
        }
    }

    pub fn reject_count(&self) -> usize {
        self.total_votes - self.approve_count
    }

    /// Visual tally, e.g. `[●●○]`
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.approved { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }

    /// Message shown when the meeting continues
    pub fn failure_message(&self) -> String {
        format!(
            "Vote failed: {}/{} voted to end. Meeting continues.",
            self.approve_count, self.total_votes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_of_three_passes() {
        let votes = vec![
            Vote::approve("a", "A", "done"),
            Vote::approve("b", "B", "done"),
            Vote::reject("c", "C", "Error getting vote: timeout"),
        ];
        let result = VoteResult::from_votes_with_rule(votes, &QuorumRule::Majority);

        assert!(result.passed);
        assert_eq!(result.approve_count, 2);
        assert_eq!(result.reject_count(), 1);
        assert_eq!(result.vote_summary(), "[●●○]");
    }

    #[test]
    fn test_tie_fails_with_message() {
        let votes = vec![
            Vote::approve("a", "A", ""),
            Vote::approve("b", "B", ""),
            Vote::reject("c", "C", ""),
            Vote::reject("d", "D", ""),
        ];
        let result = VoteResult::from_votes_with_rule(votes, &QuorumRule::Majority);

        assert!(!result.passed);
        assert_eq!(
            result.failure_message(),
            "Vote failed: 2/4 voted to end. Meeting continues."
        );
    }
}
