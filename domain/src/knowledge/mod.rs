//! Knowledge scopes, retrieval results and document chunking.

pub mod chunking;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::meeting::entities::Citation;

/// Owner of a similarity collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum KnowledgeScope {
    /// Documents shared by everyone in a meeting
    Meeting(String),
    /// A persona's private knowledge stack. Any number of participants
    /// may be attached to the same stack.
    Stack(String),
}

impl KnowledgeScope {
    /// Name of the backing collection in the vector index
    pub fn collection_name(&self) -> String {
        match self {
            KnowledgeScope::Meeting(id) => format!("meeting_{}_shared", id),
            KnowledgeScope::Stack(id) => format!("persona_{}_knowledge", id),
        }
    }
}

/// One retrieved passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    /// Similarity, higher is more relevant
    pub score: f32,
    pub document_id: String,
    pub chunk_index: usize,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl SearchResult {
    pub fn to_citation(&self) -> Citation {
        Citation {
            source: self.document_id.clone(),
            title: self
                .metadata
                .get("title")
                .and_then(|t| t.as_str())
                .map(str::to_string),
            snippet: self.text.clone(),
            score: Some(self.score),
        }
    }
}
