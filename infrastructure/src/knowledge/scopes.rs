//! In-memory knowledge scope registry

use async_trait::async_trait;
use sabha_application::{KnowledgeError, KnowledgeScopeStore};
use sabha_domain::KnowledgeScope;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryKnowledgeScopes {
    shared: RwLock<HashSet<String>>,
    /// participant id → attached stacks
    private: RwLock<HashMap<String, Vec<KnowledgeScope>>>,
}

impl InMemoryKnowledgeScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a meeting a shared knowledge base, returning its scope.
    pub async fn share_with_meeting(&self, meeting_id: &str) -> KnowledgeScope {
        self.shared.write().await.insert(meeting_id.to_string());
        KnowledgeScope::Meeting(meeting_id.to_string())
    }

    /// Attach the knowledge stack `stack_id` to a participant, returning its
    /// scope. Attaching the same stack twice is a no-op.
    pub async fn attach_to_participant(&self, participant_id: &str, stack_id: &str) -> KnowledgeScope {
        let scope = KnowledgeScope::Stack(stack_id.to_string());
        let mut private = self.private.write().await;
        let scopes = private.entry(participant_id.to_string()).or_default();
        if !scopes.contains(&scope) {
            scopes.push(scope.clone());
        }
        scope
    }
}

#[async_trait]
impl KnowledgeScopeStore for InMemoryKnowledgeScopes {
    async fn meeting_scope(&self, meeting_id: &str) -> Result<Option<KnowledgeScope>, KnowledgeError> {
        Ok(self
            .shared
            .read()
            .await
            .contains(meeting_id)
            .then(|| KnowledgeScope::Meeting(meeting_id.to_string())))
    }

    async fn participant_scopes(
        &self,
        participant_id: &str,
    ) -> Result<Vec<KnowledgeScope>, KnowledgeError> {
        Ok(self
            .private
            .read()
            .await
            .get(participant_id)
            .cloned()
            .unwrap_or_default())
    }
}
