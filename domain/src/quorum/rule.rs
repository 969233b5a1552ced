//! Rules that decide whether an end-meeting vote passes.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Rule for deciding an end-meeting vote
///
/// - `Majority`: strictly more than half vote to end (default)
/// - `Unanimous`: every participant votes to end
/// - `AtLeast(n)`: at least n participants vote to end
/// - `Percentage(p)`: at least p% vote to end
///
/// # Example
///
/// ```
/// use sabha_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::Majority;
/// assert!(rule.is_satisfied(2, 3));
/// assert!(!rule.is_satisfied(2, 4)); // a tie keeps the meeting going
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    #[default]
    Majority,
    Unanimous,
    AtLeast(usize),
    Percentage(u8),
}

impl QuorumRule {
    /// Check the rule for `approvals` yes-votes out of `total`.
    ///
    /// An empty electorate never satisfies any rule.
    pub fn is_satisfied(&self, approvals: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }

        match self {
            QuorumRule::Majority => approvals > total / 2,
            QuorumRule::Unanimous => approvals == total,
            QuorumRule::AtLeast(n) => approvals >= *n,
            QuorumRule::Percentage(_) => approvals >= self.min_approvals_needed(total).max(1),
        }
    }

    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (everyone agrees to end)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} votes to end", n),
            QuorumRule::Percentage(p) => format!("at least {}% vote to end", p),
        }
    }

    pub fn min_approvals_needed(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRule(s.to_string());
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => s
                .split(':')
                .nth(1)
                .and_then(|n| n.trim().parse().ok())
                .map(QuorumRule::AtLeast)
                .ok_or_else(invalid),
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num = s.trim_start_matches("percentage:").trim_end_matches('%');
                match num.trim().parse::<u8>() {
                    Ok(p) if p <= 100 => Ok(QuorumRule::Percentage(p)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}
