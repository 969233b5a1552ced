//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod knowledge;
pub mod llm_gateway;
pub mod meeting_store;
pub mod progress;
pub mod tool_executor;
