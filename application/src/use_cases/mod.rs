//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod end_meeting;
pub mod index_document;
pub mod run_turn;
pub mod search_knowledge;

#[cfg(test)]
pub(crate) mod test_support;
