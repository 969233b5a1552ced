//! Prompt domain
//!
//! Persona prompts, the default roster, and the end-vote and summary templates.

mod template;

pub use template::{
    DEFAULT_ROSTER, Persona, PromptTemplate, VOTE_HISTORY_LIMIT, VOTE_MESSAGE_CHARS,
};
