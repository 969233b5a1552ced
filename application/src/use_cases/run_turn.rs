//! Run Turn use case
//!
//! One participant's contribution: build the context from the transcript,
//! ask the participant's model, execute the tools it requested, and append
//! the resulting message.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{
    CompletionRequest, EventStream, GatewayError, LlmProvider, ProviderFactory,
};
use crate::ports::meeting_store::{MeetingStore, StoreError};
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort};
use futures::StreamExt;
use sabha_domain::{
    Citation, DomainError, MeetingSnapshot, Message, NewConsensus, NewDisagreement, NewMessage,
    Participant, PromptTemplate, SenderType, StreamEvent, ToolArtifact, ToolCall, TurnPhase,
    TurnResult, Usage, tool_only_placeholder,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a turn
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Provider error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Turn cancelled")]
    Cancelled,
}

impl RunTurnError {
    /// Whether the meeting or participant does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            RunTurnError::MeetingNotFound(_) | RunTurnError::ParticipantNotFound(_) => true,
            RunTurnError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Input for the RunTurn use case
#[derive(Debug, Clone, PartialEq)]
pub struct RunTurnInput {
    pub meeting_id: String,
    pub participant_id: String,
}

impl RunTurnInput {
    pub fn new(meeting_id: impl Into<String>, participant_id: impl Into<String>) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            participant_id: participant_id.into(),
        }
    }
}

/// Everything resolved before the model is called
struct PreparedTurn {
    participant: Participant,
    provider: Arc<dyn LlmProvider>,
    request: CompletionRequest,
    context: ToolContext,
}

/// Text, reasoning and tool activity gathered while the model answers
#[derive(Default)]
struct TurnDraft {
    text: String,
    reasoning: String,
    tool_names: Vec<String>,
    artifacts: Vec<ToolArtifact>,
    disagreements: Vec<NewDisagreement>,
    consensus: Vec<NewConsensus>,
    citations: Vec<Citation>,
}

/// What the streaming loop observed next
enum Step {
    Event(Option<StreamEvent>),
    Cancelled,
}

/// Use case for running a single participant turn
pub struct RunTurnUseCase {
    store: Arc<dyn MeetingStore>,
    providers: Arc<dyn ProviderFactory>,
    tools: Arc<dyn ToolExecutorPort>,
    logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl RunTurnUseCase {
    pub fn new(
        store: Arc<dyn MeetingStore>,
        providers: Arc<dyn ProviderFactory>,
        tools: Arc<dyn ToolExecutorPort>,
    ) -> Self {
        Self {
            store,
            providers,
            tools,
            logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Abort in-flight turns when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(|t| t.is_cancelled())
    }

    /// Run a turn with a blocking completion.
    ///
    /// Tool calls are executed after the completion returns. Cancellation
    /// is honoured until the tool round ends; once persisting starts it runs
    /// to completion. Nothing is persisted when the provider fails or the
    /// turn is cancelled.
    pub async fn execute(&self, input: &RunTurnInput) -> Result<TurnResult, RunTurnError> {
        let (prepared, draft, usage) = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(RunTurnError::Cancelled),
                    gathered = self.run_blocking(input) => gathered?,
                }
            }
            None => self.run_blocking(input).await?,
        };

        self.persist(&prepared, draft, &usage).await
    }

    /// Completion plus tool round; writes nothing
    async fn run_blocking(
        &self,
        input: &RunTurnInput,
    ) -> Result<(PreparedTurn, TurnDraft, Usage), RunTurnError> {
        let prepared = self.prepare(input).await?;

        debug!(phase = TurnPhase::AwaitingCompletion.as_str(), "Requesting completion");
        let response = prepared
            .provider
            .complete(prepared.request.clone())
            .await?;

        let mut draft = TurnDraft {
            text: response.content.clone().unwrap_or_default(),
            reasoning: response.reasoning.clone().unwrap_or_default(),
            ..Default::default()
        };

        if response.has_tool_calls() {
            debug!(
                phase = TurnPhase::ToolRound.as_str(),
                calls = response.tool_calls.len(),
                "Executing tool calls"
            );
            for call in &response.tool_calls {
                self.run_tool(call, &prepared.context, &mut draft).await;
            }
        }

        Ok((prepared, draft, response.usage))
    }

    /// Run a turn as an event stream.
    ///
    /// Text, reasoning and tool-call events are re-emitted as they arrive;
    /// each tool call is executed immediately and followed by its
    /// `ToolResult` (and any `Citation`s). The stream ends with `Done`
    /// carrying the persisted message id, or with a single `Error`.
    pub fn execute_streaming(&self, input: RunTurnInput) -> EventStream<'_> {
        Box::pin(async_stream::stream! {
            let prepared = match self.prepare(&input).await {
                Ok(prepared) => prepared,
                Err(e) => {
                    yield StreamEvent::error(e.to_string());
                    return;
                }
            };

            debug!(phase = TurnPhase::AwaitingCompletion.as_str(), "Opening provider stream");
            let mut events = prepared.provider.stream(prepared.request.clone());
            let mut draft = TurnDraft::default();

            let usage = loop {
                let step = match &self.cancellation_token {
                    Some(token) => {
                        tokio::select! {
                            biased;
                            _ = token.cancelled() => Step::Cancelled,
                            next = events.next() => Step::Event(next),
                        }
                    }
                    None => Step::Event(events.next().await),
                };

                let event = match step {
                    Step::Cancelled => {
                        warn!(participant = %prepared.participant.name, "Turn cancelled mid-stream");
                        yield StreamEvent::error(RunTurnError::Cancelled.to_string());
                        return;
                    }
                    Step::Event(None) => {
                        let e = RunTurnError::Stream("provider stream ended without a terminal event".into());
                        yield StreamEvent::error(e.to_string());
                        return;
                    }
                    Step::Event(Some(event)) => event,
                };

                match event {
                    StreamEvent::TextDelta { text } => {
                        draft.text.push_str(&text);
                        yield StreamEvent::TextDelta { text };
                    }
                    StreamEvent::ReasoningDelta { text } => {
                        draft.reasoning.push_str(&text);
                        yield StreamEvent::ReasoningDelta { text };
                    }
                    StreamEvent::ToolCall { call } => {
                        yield StreamEvent::ToolCall { call: call.clone() };
                        debug!(phase = TurnPhase::ToolRound.as_str(), tool = %call.name, "Executing tool call");
                        let citations_before = draft.citations.len();
                        let output = self.run_tool(&call, &prepared.context, &mut draft).await;
                        yield StreamEvent::ToolResult {
                            call_id: call.id.clone(),
                            tool_name: call.name.clone(),
                            output,
                        };
                        for citation in draft.citations[citations_before..].to_vec() {
                            yield StreamEvent::Citation { citation };
                        }
                    }
                    StreamEvent::Citation { citation } => {
                        draft.citations.push(citation.clone());
                        yield StreamEvent::Citation { citation };
                    }
                    StreamEvent::ToolResult { .. } => {
                        // Tool results originate here, never from a provider
                    }
                    StreamEvent::Done { usage, .. } => break usage,
                    StreamEvent::Error { message } => {
                        warn!(participant = %prepared.participant.name, error = %message, "Provider stream failed");
                        yield StreamEvent::Error { message };
                        return;
                    }
                }
            };
            drop(events);

            if self.is_cancelled() {
                yield StreamEvent::error(RunTurnError::Cancelled.to_string());
                return;
            }

            match self.persist(&prepared, draft, &usage).await {
                Ok(result) => yield StreamEvent::done_with_message(usage, result.message.id),
                Err(e) => yield StreamEvent::error(e.to_string()),
            }
        })
    }

    /// Load the meeting, resolve the participant's provider, build the request
    async fn prepare(&self, input: &RunTurnInput) -> Result<PreparedTurn, RunTurnError> {
        let snapshot = self
            .store
            .get_snapshot(&input.meeting_id)
            .await?
            .ok_or_else(|| RunTurnError::MeetingNotFound(input.meeting_id.clone()))?;
        let participant = snapshot
            .participant(&input.participant_id)
            .cloned()
            .ok_or_else(|| RunTurnError::ParticipantNotFound(input.participant_id.clone()))?;

        let defaults = self.providers.defaults();
        let config = participant.provider_config.resolve(&defaults)?;
        let provider = self.providers.create(&config)?;

        info!(
            meeting = %input.meeting_id,
            participant = %participant.name,
            provider = provider.name(),
            model = %config.model,
            "Starting turn"
        );

        let messages = build_context(&snapshot, &participant);
        debug!(
            phase = TurnPhase::ContextBuilt.as_str(),
            messages = messages.len(),
            "Context built"
        );

        let request = CompletionRequest::new(messages)
            .with_tools(self.tools.definitions())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);

        let context = ToolContext {
            meeting_id: input.meeting_id.clone(),
            participant_id: participant.id.clone(),
            participant_name: participant.name.clone(),
        };

        Ok(PreparedTurn {
            participant,
            provider,
            request,
            context,
        })
    }

    /// Execute one tool call and fold its outcome into the draft.
    /// Returns the narration fed back as the tool result.
    async fn run_tool(&self, call: &ToolCall, context: &ToolContext, draft: &mut TurnDraft) -> String {
        let outcome = self.tools.execute(call, context).await;

        self.logger.log(ConversationEvent::new(
            "tool_executed",
            json!({
                "meeting_id": context.meeting_id,
                "participant": context.participant_name,
                "tool": call.name,
                "arguments": call.arguments_json(),
                "output": outcome.output,
            }),
        ));

        draft.tool_names.push(call.name.clone());
        draft.artifacts.push(ToolArtifact {
            tool: call.name.clone(),
            result: outcome.output.clone(),
        });
        draft.disagreements.extend(outcome.disagreement);
        draft.consensus.extend(outcome.consensus);
        draft.citations.extend(outcome.citations);
        outcome.output
    }

    async fn persist(
        &self,
        prepared: &PreparedTurn,
        draft: TurnDraft,
        usage: &Usage,
    ) -> Result<TurnResult, RunTurnError> {
        let participant = &prepared.participant;
        let content = if draft.text.trim().is_empty() && !draft.tool_names.is_empty() {
            tool_only_placeholder(&participant.name, draft.tool_names.iter().map(String::as_str))
        } else {
            draft.text
        };
        let reasoning = Some(draft.reasoning.trim().to_string());
        let cost = prepared.provider.estimate_cost(usage);

        let message = self
            .store
            .append_message(
                &prepared.context.meeting_id,
                NewMessage::ai(participant, content)
                    .with_thinking(reasoning)
                    .with_citations(draft.citations)
                    .with_tool_artifacts(draft.artifacts)
                    .with_cost(cost),
            )
            .await?;

        let meeting_id = &prepared.context.meeting_id;
        let mut disagreements = Vec::with_capacity(draft.disagreements.len());
        for record in draft.disagreements {
            disagreements.push(self.store.save_disagreement(meeting_id, record).await?);
        }
        let mut consensus = Vec::with_capacity(draft.consensus.len());
        for record in draft.consensus {
            consensus.push(self.store.save_consensus(meeting_id, record).await?);
        }

        if cost > 0.0 {
            self.store.increment_cost(meeting_id, cost).await?;
        }

        debug!(phase = TurnPhase::Persisted.as_str(), message_id = %message.id, "Turn persisted");
        self.logger.log(ConversationEvent::new(
            "turn_completed",
            json!({
                "meeting_id": message.meeting_id,
                "message_id": message.id,
                "participant": participant.name,
                "provider": prepared.provider.name(),
                "model": prepared.provider.model(),
                "content_chars": message.content.chars().count(),
                "tools": draft.tool_names,
                "prompt_tokens": usage.prompt_tokens,
                "completion_tokens": usage.completion_tokens,
                "cost": cost,
            }),
        ));

        Ok(TurnResult {
            message,
            disagreements,
            consensus,
        })
    }
}

/// Translate the transcript into provider messages from `participant`'s
/// point of view.
///
/// The participant's own turns become assistant messages; everyone else is
/// a user message tagged with the speaker so single-speaker chat APIs can
/// still tell the voices apart.
pub fn build_context(snapshot: &MeetingSnapshot, participant: &Participant) -> Vec<Message> {
    let mut messages = Vec::with_capacity(snapshot.messages.len() + 1);
    messages.push(Message::system(PromptTemplate::turn_system(
        &participant.system_prompt,
        &snapshot.meeting.agenda,
    )));

    for msg in &snapshot.messages {
        let translated = match msg.sender_type {
            SenderType::Ai if msg.sender_id.as_deref() == Some(participant.id.as_str()) => {
                Message::assistant(msg.content.clone())
            }
            SenderType::Ai => Message::user(format!("AI [{}]: {}", msg.sender_name, msg.content)),
            SenderType::User => Message::user(format!("User: {}", msg.content)),
            SenderType::System => Message::user(format!("System: {}", msg.content)),
        };
        messages.push(translated);
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        MockFactory, MockStore, RecordingLogger, RecordingTools, ScriptedProvider,
    };
    use sabha_domain::{LlmResponse, NewParticipant, ProviderConfig, Role};

    struct Fixture {
        store: Arc<MockStore>,
        provider: Arc<ScriptedProvider>,
        logger: Arc<RecordingLogger>,
        meeting_id: String,
        participants: Vec<Participant>,
    }

    fn fixture(agenda: &str, provider: ScriptedProvider) -> Fixture {
        let store = Arc::new(MockStore::new());
        let (meeting_id, participants) = store.seed(
            agenda,
            vec![
                NewParticipant::new("The CTO", "cto", "You are the CTO.")
                    .with_provider_config(ProviderConfig::default().with_temperature(0.3)),
                NewParticipant::new("The Investor", "investor", "You are the investor."),
            ],
        );
        Fixture {
            store,
            provider: Arc::new(provider),
            logger: Arc::new(RecordingLogger::default()),
            meeting_id,
            participants,
        }
    }

    fn use_case(f: &Fixture) -> RunTurnUseCase {
        let factory = MockFactory::new().with_provider(f.provider.clone());
        RunTurnUseCase::new(
            f.store.clone(),
            Arc::new(factory),
            Arc::new(RecordingTools::new()),
        )
        .with_conversation_logger(f.logger.clone())
    }

    fn cto_input(f: &Fixture) -> RunTurnInput {
        RunTurnInput::new(&f.meeting_id, &f.participants[0].id)
    }

    #[tokio::test]
    async fn test_turn_with_single_user_message() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model")
                .with_response(Ok(LlmResponse::from_text("Below $200."))),
        );
        f.store
            .seed_message(&f.meeting_id, NewMessage::user("What's our CAC target?"));

        let result = use_case(&f).execute(&cto_input(&f)).await.unwrap();

        let request = f.provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content_str(), "You are the CTO.");
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content_str(), "User: What's our CAC target?");
        assert_eq!(request.temperature, 0.3);

        assert_eq!(result.message.sender_name, "The CTO");
        assert_eq!(result.message.sender_id.as_deref(), Some(f.participants[0].id.as_str()));
        assert_eq!(result.message.content, "Below $200.");
        assert_eq!(f.store.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_context_attributes_speakers() {
        let f = fixture("Pricing for Q3", ScriptedProvider::new("default-model"));
        let cto = &f.participants[0];
        let investor = &f.participants[1];
        f.store.seed_message(&f.meeting_id, NewMessage::user("Kick off"));
        f.store.seed_message(&f.meeting_id, NewMessage::ai(cto, "We can ship"));
        f.store.seed_message(&f.meeting_id, NewMessage::ai(investor, "At what cost?"));
        f.store.seed_message(&f.meeting_id, NewMessage::system("Vote failed"));

        let snapshot = f.store.get_snapshot(&f.meeting_id).await.unwrap().unwrap();
        let context = build_context(&snapshot, cto);

        assert_eq!(
            context[0].content_str(),
            "You are the CTO.\n\nMEETING AGENDA:\nPricing for Q3"
        );
        let rendered: Vec<(Role, &str)> = context[1..]
            .iter()
            .map(|m| (m.role, m.content_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (Role::User, "User: Kick off"),
                (Role::Assistant, "We can ship"),
                (Role::User, "AI [The Investor]: At what cost?"),
                (Role::User, "System: Vote failed"),
            ]
        );
    }

    #[tokio::test]
    async fn test_tool_only_turn_gets_placeholder() {
        let response = LlmResponse::from_text("").with_tool_call(
            ToolCall::new("call_0", "log_disagreement")
                .with_arg("target_participant_name", "The Investor")
                .with_arg("topic", "burn rate"),
        );
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_response(Ok(response)),
        );

        let result = use_case(&f).execute(&cto_input(&f)).await.unwrap();

        assert_eq!(result.message.content, "[The CTO used tools: log_disagreement]");
        assert_eq!(result.disagreements.len(), 1);
        assert_eq!(result.disagreements[0].meeting_id, f.meeting_id);
        assert_eq!(f.store.disagreement_count(), 1);
        assert_eq!(result.message.tool_artifacts.len(), 1);
        assert_eq!(
            result.message.tool_artifacts[0].result,
            "Disagreement logged with The Investor on: burn rate"
        );
        assert_eq!(f.logger.event_types(), vec!["tool_executed", "turn_completed"]);
    }

    #[tokio::test]
    async fn test_provider_failure_persists_nothing() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_response(Err(GatewayError::Api {
                status: 500,
                message: "boom".into(),
            })),
        );

        let err = use_case(&f).execute(&cto_input(&f)).await.unwrap_err();

        assert!(matches!(err, RunTurnError::Gateway(GatewayError::Api { status: 500, .. })));
        assert!(f.store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(MockStore::failing_appends());
        let (meeting_id, participants) =
            store.seed("", vec![NewParticipant::new("The CTO", "cto", "You are the CTO.")]);
        let provider = Arc::new(
            ScriptedProvider::new("default-model").with_response(Ok(LlmResponse::from_text("hi"))),
        );
        let uc = RunTurnUseCase::new(
            store.clone(),
            Arc::new(MockFactory::new().with_provider(provider)),
            Arc::new(RecordingTools::new()),
        );

        let err = uc
            .execute(&RunTurnInput::new(&meeting_id, &participants[0].id))
            .await
            .unwrap_err();

        assert!(matches!(err, RunTurnError::Store(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_unknown_participant_is_not_found() {
        let f = fixture("", ScriptedProvider::new("default-model"));
        let err = use_case(&f)
            .execute(&RunTurnInput::new(&f.meeting_id, "nobody"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = use_case(&f)
            .execute(&RunTurnInput::new("missing", "nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunTurnError::MeetingNotFound(_)));
    }

    #[tokio::test]
    async fn test_cost_is_recorded() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model")
                .with_price(0.001)
                .with_response(Ok(LlmResponse::from_text("ok").with_usage(Usage::new(100, 50)))),
        );

        let result = use_case(&f).execute(&cto_input(&f)).await.unwrap();

        assert!((result.message.estimated_cost - 0.15).abs() < 1e-9);
        assert!((f.store.meeting(&f.meeting_id).total_cost - 0.15).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_streaming_turn_emits_and_persists() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_stream(vec![
                StreamEvent::reasoning("thinking"),
                StreamEvent::text("Hello "),
                StreamEvent::text("board"),
                StreamEvent::ToolCall {
                    call: ToolCall::new("c1", "log_consensus").with_arg("topic", "pricing"),
                },
                StreamEvent::done(Usage::new(10, 5)),
            ]),
        );
        let uc = use_case(&f);

        let events: Vec<StreamEvent> = uc.execute_streaming(cto_input(&f)).collect().await;

        assert!(matches!(events[0], StreamEvent::ReasoningDelta { .. }));
        assert!(matches!(events[3], StreamEvent::ToolCall { .. }));
        match &events[4] {
            StreamEvent::ToolResult { call_id, output, .. } => {
                assert_eq!(call_id, "c1");
                assert_eq!(output, "Consensus logged: pricing");
            }
            other => panic!("expected tool result, got {:?}", other),
        }
        let saved = f.store.messages();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].content, "Hello board");
        assert_eq!(f.store.consensus_count(), 1);
        assert_eq!(saved[0].thinking.as_deref(), Some("thinking"));
        match events.last().unwrap() {
            StreamEvent::Done { message_id, usage } => {
                assert_eq!(message_id.as_deref(), Some(saved[0].id.as_str()));
                assert_eq!(usage.total_tokens, 15);
            }
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_streaming_provider_error_persists_nothing() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_stream(vec![
                StreamEvent::text("partial"),
                StreamEvent::error("connection reset"),
            ]),
        );
        let uc = use_case(&f);

        let events: Vec<StreamEvent> = uc.execute_streaming(cto_input(&f)).collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[1], StreamEvent::error("connection reset"));
        assert!(f.store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_streaming_error_after_tool_call_leaves_no_records() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_stream(vec![
                StreamEvent::ToolCall {
                    call: ToolCall::new("c1", "log_disagreement")
                        .with_arg("target_participant_name", "The Investor")
                        .with_arg("topic", "runway"),
                },
                StreamEvent::error("connection reset"),
            ]),
        );
        let uc = use_case(&f);

        let events: Vec<StreamEvent> = uc.execute_streaming(cto_input(&f)).collect().await;

        assert_eq!(events.last(), Some(&StreamEvent::error("connection reset")));
        assert!(f.store.messages().is_empty());
        assert_eq!(f.store.disagreement_count(), 0);
    }

    #[tokio::test]
    async fn test_streaming_without_terminal_event_is_error() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_stream(vec![StreamEvent::text("hi")]),
        );
        let uc = use_case(&f);

        let events: Vec<StreamEvent> = uc.execute_streaming(cto_input(&f)).collect().await;

        assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
        assert!(f.store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_stream_persists_nothing() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_stream(vec![
                StreamEvent::text("never"),
                StreamEvent::done(Usage::default()),
            ]),
        );
        let token = CancellationToken::new();
        token.cancel();
        let uc = use_case(&f).with_cancellation(token);

        let events: Vec<StreamEvent> = uc.execute_streaming(cto_input(&f)).collect().await;

        assert_eq!(events, vec![StreamEvent::error("Turn cancelled")]);
        assert!(f.store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_blocking_turn() {
        let f = fixture(
            "",
            ScriptedProvider::new("default-model").with_response(Ok(LlmResponse::from_text("x"))),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = use_case(&f)
            .with_cancellation(token)
            .execute(&cto_input(&f))
            .await
            .unwrap_err();

        assert!(matches!(err, RunTurnError::Cancelled));
        assert!(f.store.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_persisting_keeps_turn_whole() {
        let store = Arc::new(MockStore::with_slow_cost(std::time::Duration::from_millis(200)));
        let (meeting_id, participants) =
            store.seed("", vec![NewParticipant::new("The CTO", "cto", "You are the CTO.")]);
        let response = LlmResponse::from_text("Raise prices.")
            .with_usage(Usage::new(100, 50))
            .with_tool_call(
                ToolCall::new("c1", "log_disagreement")
                    .with_arg("target_participant_name", "The Investor")
                    .with_arg("topic", "pricing"),
            );
        let provider = Arc::new(
            ScriptedProvider::new("default-model")
                .with_price(0.001)
                .with_response(Ok(response)),
        );
        let token = CancellationToken::new();
        let uc = RunTurnUseCase::new(
            store.clone(),
            Arc::new(MockFactory::new().with_provider(provider)),
            Arc::new(RecordingTools::new()),
        )
        .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            token.cancel();
        });
        let result = uc
            .execute(&RunTurnInput::new(&meeting_id, &participants[0].id))
            .await;
        canceller.await.unwrap();

        let result = result.unwrap();
        assert_eq!(result.disagreements.len(), 1);
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.disagreement_count(), 1);
        assert!((store.meeting(&meeting_id).total_cost - 0.15).abs() < 1e-9);
    }
}
