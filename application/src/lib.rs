//! Application layer for sabha
//!
//! This crate contains the use cases (turn orchestration, end-meeting vote,
//! knowledge retrieval and indexing) and the ports their adapters implement.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    knowledge::{
        EmbeddingProvider, KnowledgeError, KnowledgeScopeStore, VectorIndex, VectorRecord,
    },
    llm_gateway::{
        CompletionRequest, EventStream, GatewayError, LlmProvider, ProviderFactory,
        response_events, stream_via_complete,
    },
    meeting_store::{MeetingStore, StoreError},
    progress::{EndMeetingProgress, NoProgress},
    tool_executor::{ToolContext, ToolExecutorPort, ToolOutcome},
};
pub use use_cases::end_meeting::{
    EndMeetingError, EndMeetingInput, EndMeetingOutput, EndMeetingUseCase,
};
pub use use_cases::index_document::{
    IndexDocumentInput, IndexDocumentUseCase, IndexReport, IndexStatus,
};
pub use use_cases::run_turn::{RunTurnError, RunTurnInput, RunTurnUseCase, build_context};
pub use use_cases::search_knowledge::RetrievalMerger;
