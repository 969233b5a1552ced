//! Domain layer for sabha
//!
//! This crate contains the entities, value objects and pure algorithms of a
//! moderated multi-persona meeting. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Meeting
//!
//! A human moderator and several AI participants ("personas") share one
//! transcript. Each participant speaks in turns through its own provider.
//!
//! ## Turn
//!
//! A turn builds a context from the transcript, asks the participant's model
//! for a reply, optionally executes the tools it requested (logging
//! disagreement or consensus, searching knowledge), and appends one message.
//!
//! ## End vote
//!
//! Ending a meeting asks every participant to vote; a [`QuorumRule`] decides.

pub mod config;
pub mod core;
pub mod knowledge;
pub mod meeting;
pub mod prompt;
pub mod provider;
pub mod quorum;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity, ToolCatalog};
pub use core::{error::DomainError, string::truncate_chars};
pub use knowledge::{
    KnowledgeScope, SearchResult,
    chunking::{ChunkingOptions, chunk_text},
};
pub use meeting::{
    Citation, Consensus, Disagreement, DisagreementStatus, Meeting, MeetingMessage,
    MeetingSnapshot, MeetingStatus, NewConsensus, NewDisagreement, NewMessage, NewParticipant, Participant,
    SenderType, ToolArtifact, TurnPhase, TurnResult, tool_only_placeholder,
};
pub use prompt::{DEFAULT_ROSTER, Persona, PromptTemplate};
pub use provider::{
    ProviderConfig, ProviderDefaults, ProviderKind, ResolvedProviderConfig,
    pricing::{ModelPrice, estimate_cost},
};
pub use quorum::{ParsedVote, QuorumRule, Vote, VoteResult, parse_end_vote};
pub use session::{
    FinishReason, LlmResponse, Message, ReasoningSplitter, Role, Segment, StreamEvent,
    ToolCallAccumulator, Usage, split_reasoning,
};
pub use tool::{
    DefaultToolValidator, ParamType, ToolCall, ToolDefinition, ToolError, ToolParameter,
    ToolSpec, ToolValidator,
};
