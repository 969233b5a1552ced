//! Provider conversation primitives.
//!
//! - [`entities::Message`]: unified chat message
//! - [`response::LlmResponse`]: blocking completion result
//! - [`stream::StreamEvent`]: normalized streaming protocol
//! - [`reasoning::ReasoningSplitter`]: `<think>` block separation
//! - [`accumulator::ToolCallAccumulator`]: streamed tool-call assembly

pub mod accumulator;
pub mod entities;
pub mod reasoning;
pub mod response;
pub mod stream;

pub use accumulator::ToolCallAccumulator;
pub use entities::{Message, Role};
pub use reasoning::{ReasoningSplitter, Segment, split_reasoning};
pub use response::{FinishReason, LlmResponse, Usage};
pub use stream::StreamEvent;
