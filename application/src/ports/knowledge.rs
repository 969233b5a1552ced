//! Knowledge ports: scope lookup, embedding and vector search.

use async_trait::async_trait;
use sabha_domain::{KnowledgeScope, SearchResult};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnowledgeError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Dimension mismatch in {collection}: expected {expected}, got {actual}")]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("Scope lookup error: {0}")]
    Scope(String),
}

/// Text → vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier used in logs (e.g., "ollama:nomic-embed-text")
    fn name(&self) -> String;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, KnowledgeError>;

    /// Embed several texts; the default embeds them one at a time.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_text(text).await?);
        }
        Ok(vectors)
    }
}

/// A chunk stored in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub document_id: String,
    pub chunk_index: usize,
    pub metadata: HashMap<String, Value>,
}

/// Named similarity collections
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Vector dimension of a collection, `None` if it does not exist
    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, KnowledgeError>;

    /// Create a collection if missing; existing collections are left alone
    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<(), KnowledgeError>;

    /// Insert or replace records by id, returning how many were written
    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize, KnowledgeError>;

    /// Top `limit` results by descending similarity.
    ///
    /// A missing collection yields no results, not an error.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, KnowledgeError>;
}

/// Resolves which knowledge scopes a meeting and its participants own
#[async_trait]
pub trait KnowledgeScopeStore: Send + Sync {
    /// The meeting's shared scope, if it has one
    async fn meeting_scope(&self, meeting_id: &str) -> Result<Option<KnowledgeScope>, KnowledgeError>;

    /// Private stacks attached to a participant, in attachment order
    async fn participant_scopes(
        &self,
        participant_id: &str,
    ) -> Result<Vec<KnowledgeScope>, KnowledgeError>;
}
