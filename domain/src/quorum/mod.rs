//! End-meeting voting.
//!
//! Every participant casts exactly one [`Vote`]; a [`QuorumRule`] turns the
//! tally into a [`VoteResult`]. Vote replies are parsed by
//! [`parse_end_vote`], which degrades instead of failing.
//!
//! ```text
//! Active ──(force)──────────────────────────▶ Ended
//!   │                                            ▲
//!   └──▶ Voting ──(rule satisfied, summary ok)──┘
//!          │
//!          └──(rule not satisfied / error)──▶ Active
//! ```

pub mod parsing;
pub mod rule;
pub mod vote;

pub use parsing::{ParsedVote, parse_end_vote};
pub use rule::QuorumRule;
pub use vote::{Vote, VoteResult};
