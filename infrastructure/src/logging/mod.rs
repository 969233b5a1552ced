//! Machine-readable meeting transcripts.
//!
//! [`JsonlConversationLogger`] implements the
//! [`ConversationLogger`](sabha_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
