//! Meeting domain: meetings, participants, transcript and the records that
//! tools write during a turn.

pub mod entities;
pub mod turn;

pub use entities::{
    Citation, Consensus, Disagreement, DisagreementStatus, Meeting, MeetingMessage,
    MeetingSnapshot, MeetingStatus, NewConsensus, NewDisagreement, NewMessage, NewParticipant, Participant,
    SenderType, ToolArtifact,
};
pub use turn::{TurnPhase, TurnResult, tool_only_placeholder};
