//! Meeting tool executor, the concrete [`ToolExecutorPort`].
//!
//! ```text
//! execute(call)
//!   ├─ not in catalog        → "Unknown tool: {name}"
//!   ├─ invalid arguments     → validator diagnostic
//!   └─ dispatch by name
//!        ├─ log_disagreement → NewDisagreement draft
//!        ├─ log_consensus    → NewConsensus draft
//!        ├─ search_knowledge_base → scopes → RetrievalMerger
//!        └─ web_search       → not-implemented diagnostic
//! ```
//!
//! Failures never escape a branch: they become the tool output so the turn
//! can still complete. Drafted records are saved by the turn along with its
//! message.

use super::knowledge::{self, MAX_RESULTS, NO_KNOWLEDGE_BASE, SEARCH_KNOWLEDGE_BASE};
use super::records::{DEFAULT_RATING, LOG_CONSENSUS, LOG_DISAGREEMENT};
use super::web::{NOT_IMPLEMENTED, WEB_SEARCH};
use async_trait::async_trait;
use sabha_application::{
    KnowledgeScopeStore, RetrievalMerger, ToolContext, ToolExecutorPort, ToolOutcome,
};
use sabha_domain::{
    DefaultToolValidator, NewConsensus, NewDisagreement, ToolCall, ToolError, ToolSpec,
    ToolValidator,
};
use std::sync::Arc;
use tracing::{debug, warn};

struct KnowledgeAccess {
    scopes: Arc<dyn KnowledgeScopeStore>,
    merger: Arc<RetrievalMerger>,
}

pub struct MeetingToolExecutor {
    tool_spec: ToolSpec,
    knowledge: Option<KnowledgeAccess>,
}

impl MeetingToolExecutor {
    /// Executor offering the default catalog
    pub fn new() -> Self {
        Self {
            tool_spec: super::default_tool_spec(),
            knowledge: None,
        }
    }

    pub fn with_tools(mut self, tool_spec: ToolSpec) -> Self {
        self.tool_spec = tool_spec;
        self
    }

    /// Enable knowledge search; without this the search tool reports that
    /// no knowledge base is available.
    pub fn with_knowledge(
        mut self,
        scopes: Arc<dyn KnowledgeScopeStore>,
        merger: Arc<RetrievalMerger>,
    ) -> Self {
        self.knowledge = Some(KnowledgeAccess { scopes, merger });
        self
    }

    fn log_disagreement(&self, call: &ToolCall, context: &ToolContext) -> Result<ToolOutcome, ToolError> {
        let target = call
            .require_string("target_participant_name")
            .map_err(ToolError::invalid_argument)?;
        let topic = call.require_string("topic").map_err(ToolError::invalid_argument)?;
        let reasoning = call.get_string("reasoning").unwrap_or_default();

        Ok(ToolOutcome {
            output: format!("Disagreement logged with {} on: {}", target, topic),
            disagreement: Some(NewDisagreement {
                source_participant_id: context.participant_id.clone(),
                target_name: target.to_string(),
                topic: topic.to_string(),
                reasoning: reasoning.to_string(),
                severity: rating(call, "severity"),
            }),
            ..Default::default()
        })
    }

    fn log_consensus(&self, call: &ToolCall) -> Result<ToolOutcome, ToolError> {
        let topic = call.require_string("topic").map_err(ToolError::invalid_argument)?;

        Ok(ToolOutcome {
            output: format!("Consensus logged: {}", topic),
            consensus: Some(NewConsensus {
                participants: call.get_string_list("participants"),
                topic: topic.to_string(),
                strength: rating(call, "strength"),
            }),
            ..Default::default()
        })
    }

    async fn search_knowledge(
        &self,
        call: &ToolCall,
        context: &ToolContext,
    ) -> Result<ToolOutcome, ToolError> {
        let query = call.require_string("query").map_err(ToolError::invalid_argument)?;
        let Some(access) = &self.knowledge else {
            return Ok(ToolOutcome::text(NO_KNOWLEDGE_BASE));
        };

        let failed = |e: sabha_application::KnowledgeError| ToolError::execution_failed(e.to_string());
        let mut collections = Vec::new();
        if let Some(scope) = access.scopes.meeting_scope(&context.meeting_id).await.map_err(failed)? {
            collections.push(scope.collection_name());
        }
        for scope in access
            .scopes
            .participant_scopes(&context.participant_id)
            .await
            .map_err(failed)?
        {
            collections.push(scope.collection_name());
        }
        if collections.is_empty() {
            return Ok(ToolOutcome::text(NO_KNOWLEDGE_BASE));
        }

        let results = access
            .merger
            .search_multiple_collections(&collections, query, MAX_RESULTS)
            .await
            .map_err(failed)?;
        debug!(
            participant = %context.participant_name,
            collections = collections.len(),
            hits = results.len(),
            "Knowledge searched"
        );
        if results.is_empty() {
            return Ok(ToolOutcome::text(knowledge::no_results(query)));
        }

        Ok(ToolOutcome {
            output: knowledge::format_results(&results),
            citations: results.iter().map(|r| r.to_citation()).collect(),
            ..Default::default()
        })
    }
}

impl Default for MeetingToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// 1–5 rating argument; absent means the default. Range was already
/// checked by the validator.
fn rating(call: &ToolCall, key: &str) -> u8 {
    call.get_i64(key)
        .and_then(|n| u8::try_from(n).ok())
        .unwrap_or(DEFAULT_RATING)
}

#[async_trait]
impl ToolExecutorPort for MeetingToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall, context: &ToolContext) -> ToolOutcome {
        let Some(definition) = self.tool_spec.get(&call.name) else {
            warn!(tool = %call.name, participant = %context.participant_name, "Unknown tool requested");
            return ToolOutcome::text(format!("Unknown tool: {}", call.name));
        };

        if let Err(e) = DefaultToolValidator.validate(call, definition) {
            warn!(tool = %call.name, error = %e, "Tool call rejected");
            return ToolOutcome::text(format!("Error: {}", e.message));
        }

        let result = match call.name.as_str() {
            LOG_DISAGREEMENT => self.log_disagreement(call, context),
            LOG_CONSENSUS => self.log_consensus(call),
            SEARCH_KNOWLEDGE_BASE => self.search_knowledge(call, context).await,
            WEB_SEARCH => Ok(ToolOutcome::text(NOT_IMPLEMENTED)),
            other => Err(ToolError::not_implemented(format!(
                "Tool '{}' has no executor",
                other
            ))),
        };

        result.unwrap_or_else(|e| {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
            ToolOutcome::text(format!("Error executing {}: {}", call.name, e.message))
        })
    }
}
