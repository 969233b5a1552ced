//! Hand-written port doubles shared by the use-case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::knowledge::{EmbeddingProvider, KnowledgeError, VectorIndex, VectorRecord};
use crate::ports::llm_gateway::{
    CompletionRequest, EventStream, GatewayError, LlmProvider, ProviderFactory,
    stream_via_complete,
};
use crate::ports::meeting_store::{MeetingStore, StoreError};
use crate::ports::tool_executor::{ToolContext, ToolExecutorPort, ToolOutcome};
use async_trait::async_trait;
use chrono::Utc;
use sabha_domain::{
    Consensus, Disagreement, DisagreementStatus, LlmResponse, Meeting, MeetingMessage,
    MeetingSnapshot, MeetingStatus, NewConsensus, NewDisagreement, NewMessage, NewParticipant,
    Participant, ProviderDefaults, ResolvedProviderConfig, SearchResult, StreamEvent, ToolCall,
    ToolDefinition, ToolSpec, Usage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==================== Knowledge ====================

pub struct FixedEmbedder {
    dimension: usize,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    fn name(&self) -> String {
        "fixed".to_string()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>, KnowledgeError> {
        Ok(vec![0.1; self.dimension])
    }
}

pub fn result(document_id: &str, score: f32) -> SearchResult {
    SearchResult {
        text: format!("passage from {}", document_id),
        score,
        document_id: document_id.to_string(),
        chunk_index: 0,
        metadata: HashMap::new(),
    }
}

#[derive(Default)]
struct StaticCollection {
    dimension: usize,
    results: Vec<SearchResult>,
    records: Vec<VectorRecord>,
}

/// Index returning canned results per collection
#[derive(Default)]
pub struct StaticIndex {
    collections: Mutex<HashMap<String, StaticCollection>>,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, dimension: usize, results: Vec<SearchResult>) -> Self {
        self.collections.lock().unwrap().insert(
            name.to_string(),
            StaticCollection {
                dimension,
                results,
                records: Vec::new(),
            },
        );
        self
    }

    pub fn record_count(&self, name: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .map_or(0, |c| c.records.len())
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, KnowledgeError> {
        Ok(self.collections.lock().unwrap().get(collection).map(|c| c.dimension))
    }

    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<(), KnowledgeError> {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_insert_with(|| StaticCollection {
                dimension,
                ..Default::default()
            });
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize, KnowledgeError> {
        let mut collections = self.collections.lock().unwrap();
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| KnowledgeError::Index(format!("no collection {}", collection)))?;
        let count = records.len();
        entry.records.extend(records);
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        _vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, KnowledgeError> {
        let collections = self.collections.lock().unwrap();
        let Some(entry) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut results = entry.results.clone();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        Ok(results)
    }
}

// ==================== Providers ====================

/// Provider replaying scripted completions or stream events
pub struct ScriptedProvider {
    model: String,
    responses: Mutex<VecDeque<Result<LlmResponse, GatewayError>>>,
    stream_events: Mutex<Option<Vec<StreamEvent>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    /// USD per token, applied to total tokens
    price_per_token: f64,
}

impl ScriptedProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            responses: Mutex::new(VecDeque::new()),
            stream_events: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            price_per_token: 0.0,
        }
    }

    pub fn with_response(self, response: Result<LlmResponse, GatewayError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_stream(self, events: Vec<StreamEvent>) -> Self {
        *self.stream_events.lock().unwrap() = Some(events);
        self
    }

    pub fn with_price(mut self, price_per_token: f64) -> Self {
        self.price_per_token = price_per_token;
        self
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("no scripted response".into())))
    }

    fn stream(&self, request: CompletionRequest) -> EventStream<'_> {
        let scripted = self.stream_events.lock().unwrap().clone();
        match scripted {
            Some(events) => {
                self.requests.lock().unwrap().push(request);
                Box::pin(futures::stream::iter(events))
            }
            None => stream_via_complete(self, request),
        }
    }

    fn estimate_cost(&self, usage: &Usage) -> f64 {
        usage.total_tokens as f64 * self.price_per_token
    }
}

/// Factory handing out scripted providers by model name
pub struct MockFactory {
    defaults: ProviderDefaults,
    providers: HashMap<String, Arc<ScriptedProvider>>,
    pub created: Mutex<Vec<ResolvedProviderConfig>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            defaults: ProviderDefaults {
                openrouter_model: "default-model".into(),
                ..ProviderDefaults::default()
            },
            providers: HashMap::new(),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_provider(mut self, provider: Arc<ScriptedProvider>) -> Self {
        self.providers.insert(provider.model.clone(), provider);
        self
    }
}

impl ProviderFactory for MockFactory {
    fn defaults(&self) -> ProviderDefaults {
        self.defaults.clone()
    }

    fn create(&self, config: &ResolvedProviderConfig) -> Result<Arc<dyn LlmProvider>, GatewayError> {
        self.created.lock().unwrap().push(config.clone());
        self.providers
            .get(&config.model)
            .map(|p| p.clone() as Arc<dyn LlmProvider>)
            .ok_or_else(|| GatewayError::Configuration(format!("no provider for {}", config.model)))
    }
}

// ==================== Store ====================

#[derive(Default)]
struct StoreState {
    meetings: HashMap<String, Meeting>,
    participants: Vec<Participant>,
    messages: Vec<MeetingMessage>,
    disagreements: Vec<Disagreement>,
    consensus: Vec<Consensus>,
    status_history: Vec<MeetingStatus>,
    next_id: usize,
}

impl StoreState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub struct MockStore {
    state: Mutex<StoreState>,
    pub fail_append: bool,
    /// Suspend inside `increment_cost` to widen the persist window
    pub cost_delay: Option<Duration>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_appends() -> Self {
        Self {
            fail_append: true,
            ..Self::default()
        }
    }

    pub fn with_slow_cost(delay: Duration) -> Self {
        Self {
            cost_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Seed a meeting and its participants synchronously
    pub fn seed(&self, agenda: &str, participants: Vec<NewParticipant>) -> (String, Vec<Participant>) {
        let mut state = self.state.lock().unwrap();
        let meeting_id = state.id("m");
        state.meetings.insert(
            meeting_id.clone(),
            Meeting {
                id: meeting_id.clone(),
                name: "Board".into(),
                agenda: agenda.into(),
                status: MeetingStatus::Active,
                total_cost: 0.0,
                created_at: Utc::now(),
            },
        );
        let mut seated = Vec::new();
        for p in participants {
            let id = state.id("p");
            let participant = Participant {
                id,
                meeting_id: meeting_id.clone(),
                name: p.name,
                role: p.role,
                system_prompt: p.system_prompt,
                provider_config: p.provider_config,
            };
            state.participants.push(participant.clone());
            seated.push(participant);
        }
        (meeting_id, seated)
    }

    pub fn seed_message(&self, meeting_id: &str, message: NewMessage) {
        let mut state = self.state.lock().unwrap();
        let id = state.id("msg");
        state.messages.push(to_message(id, meeting_id, message));
    }

    pub fn messages(&self) -> Vec<MeetingMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn meeting(&self, meeting_id: &str) -> Meeting {
        self.state.lock().unwrap().meetings[meeting_id].clone()
    }

    pub fn set_status(&self, meeting_id: &str, status: MeetingStatus) {
        if let Some(m) = self.state.lock().unwrap().meetings.get_mut(meeting_id) {
            m.status = status;
        }
    }

    pub fn status_history(&self) -> Vec<MeetingStatus> {
        self.state.lock().unwrap().status_history.clone()
    }

    pub fn disagreement_count(&self) -> usize {
        self.state.lock().unwrap().disagreements.len()
    }

    pub fn consensus_count(&self) -> usize {
        self.state.lock().unwrap().consensus.len()
    }
}

fn to_message(id: String, meeting_id: &str, message: NewMessage) -> MeetingMessage {
    MeetingMessage {
        id,
        meeting_id: meeting_id.to_string(),
        sender_type: message.sender_type,
        sender_id: message.sender_id,
        sender_name: message.sender_name,
        content: message.content,
        thinking: message.thinking,
        citations: message.citations,
        tool_artifacts: message.tool_artifacts,
        estimated_cost: message.estimated_cost,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl MeetingStore for MockStore {
    async fn create_meeting(&self, _name: &str, agenda: &str) -> Result<Meeting, StoreError> {
        let (id, _) = self.seed(agenda, vec![]);
        Ok(self.meeting(&id))
    }

    async fn add_participant(
        &self,
        meeting_id: &str,
        participant: NewParticipant,
    ) -> Result<Participant, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.id("p");
        let participant = Participant {
            id,
            meeting_id: meeting_id.to_string(),
            name: participant.name,
            role: participant.role,
            system_prompt: participant.system_prompt,
            provider_config: participant.provider_config,
        };
        state.participants.push(participant.clone());
        Ok(participant)
    }

    async fn get_snapshot(&self, meeting_id: &str) -> Result<Option<MeetingSnapshot>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.meetings.get(meeting_id).map(|meeting| MeetingSnapshot {
            meeting: meeting.clone(),
            participants: state
                .participants
                .iter()
                .filter(|p| p.meeting_id == meeting_id)
                .cloned()
                .collect(),
            messages: state
                .messages
                .iter()
                .filter(|m| m.meeting_id == meeting_id)
                .cloned()
                .collect(),
        }))
    }

    async fn append_message(
        &self,
        meeting_id: &str,
        message: NewMessage,
    ) -> Result<MeetingMessage, StoreError> {
        if self.fail_append {
            return Err(StoreError::Backend("disk full".into()));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.id("msg");
        let saved = to_message(id, meeting_id, message);
        state.messages.push(saved.clone());
        Ok(saved)
    }

    async fn increment_cost(&self, meeting_id: &str, amount: f64) -> Result<(), StoreError> {
        if let Some(delay) = self.cost_delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        let meeting = state
            .meetings
            .get_mut(meeting_id)
            .ok_or_else(|| StoreError::MeetingNotFound(meeting_id.into()))?;
        meeting.total_cost += amount;
        Ok(())
    }

    async fn update_status(&self, meeting_id: &str, status: MeetingStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let meeting = state
            .meetings
            .get_mut(meeting_id)
            .ok_or_else(|| StoreError::MeetingNotFound(meeting_id.into()))?;
        meeting.status = status;
        state.status_history.push(status);
        Ok(())
    }

    async fn save_disagreement(
        &self,
        meeting_id: &str,
        d: NewDisagreement,
    ) -> Result<Disagreement, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.id("d");
        let saved = Disagreement {
            id,
            meeting_id: meeting_id.into(),
            source_participant_id: d.source_participant_id,
            target_name: d.target_name,
            topic: d.topic,
            reasoning: d.reasoning,
            severity: d.severity,
            status: DisagreementStatus::Open,
            created_at: Utc::now(),
        };
        state.disagreements.push(saved.clone());
        Ok(saved)
    }

    async fn save_consensus(&self, meeting_id: &str, c: NewConsensus) -> Result<Consensus, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.id("c");
        let saved = Consensus {
            id,
            meeting_id: meeting_id.into(),
            participants: c.participants,
            topic: c.topic,
            strength: c.strength,
            created_at: Utc::now(),
        };
        state.consensus.push(saved.clone());
        Ok(saved)
    }

    async fn list_disagreements(&self, meeting_id: &str) -> Result<Vec<Disagreement>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .disagreements
            .iter()
            .filter(|d| d.meeting_id == meeting_id)
            .cloned()
            .collect())
    }

    async fn list_consensus(&self, meeting_id: &str) -> Result<Vec<Consensus>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .consensus
            .iter()
            .filter(|c| c.meeting_id == meeting_id)
            .cloned()
            .collect())
    }
}

// ==================== Tools ====================

/// Executor that records calls and drafts records the way the real one does
pub struct RecordingTools {
    spec: ToolSpec,
    pub calls: Mutex<Vec<ToolCall>>,
}

impl RecordingTools {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new()
                .register(ToolDefinition::new("log_disagreement", "Record a disagreement"))
                .register(ToolDefinition::new("log_consensus", "Record consensus")),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for RecordingTools {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall, context: &ToolContext) -> ToolOutcome {
        self.calls.lock().unwrap().push(call.clone());
        match call.name.as_str() {
            "log_disagreement" => {
                let target = call.get_string("target_participant_name").unwrap_or("someone");
                let topic = call.get_string("topic").unwrap_or("");
                ToolOutcome {
                    output: format!("Disagreement logged with {} on: {}", target, topic),
                    disagreement: Some(NewDisagreement {
                        source_participant_id: context.participant_id.clone(),
                        target_name: target.into(),
                        topic: topic.into(),
                        reasoning: String::new(),
                        severity: 3,
                    }),
                    ..Default::default()
                }
            }
            "log_consensus" => {
                let topic = call.get_string("topic").unwrap_or("");
                ToolOutcome {
                    output: format!("Consensus logged: {}", topic),
                    consensus: Some(NewConsensus {
                        participants: call.get_string_list("participants"),
                        topic: topic.into(),
                        strength: 3,
                    }),
                    ..Default::default()
                }
            }
            other => ToolOutcome::text(format!("Unknown tool: {}", other)),
        }
    }
}

// ==================== Logger ====================

#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
