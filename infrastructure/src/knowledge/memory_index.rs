//! In-memory vector index
//!
//! Collections are flat lists searched exhaustively with cosine similarity.
//! Adequate for a CLI session with a handful of documents.

use async_trait::async_trait;
use sabha_application::{KnowledgeError, VectorIndex, VectorRecord};
use sabha_domain::SearchResult;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

struct Collection {
    dimension: usize,
    records: Vec<VectorRecord>,
}

#[derive(Default)]
pub struct InMemoryVectorIndex {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored in a collection (0 if missing)
    pub async fn record_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.records.len())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, KnowledgeError> {
        Ok(self.collections.read().await.get(collection).map(|c| c.dimension))
    }

    async fn create_collection(&self, collection: &str, dimension: usize) -> Result<(), KnowledgeError> {
        let mut collections = self.collections.write().await;
        if !collections.contains_key(collection) {
            debug!(collection, dimension, "Creating collection");
            collections.insert(
                collection.to_string(),
                Collection {
                    dimension,
                    records: Vec::new(),
                },
            );
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<usize, KnowledgeError> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| KnowledgeError::Index(format!("collection {} does not exist", collection)))?;

        if let Some(bad) = records.iter().find(|r| r.vector.len() != target.dimension) {
            return Err(KnowledgeError::DimensionMismatch {
                collection: collection.to_string(),
                expected: target.dimension,
                actual: bad.vector.len(),
            });
        }

        let written = records.len();
        for record in records {
            match target.records.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => target.records.push(record),
            }
        }
        Ok(written)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, KnowledgeError> {
        let collections = self.collections.read().await;
        let Some(target) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        if vector.len() != target.dimension {
            return Err(KnowledgeError::DimensionMismatch {
                collection: collection.to_string(),
                expected: target.dimension,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<(f32, &VectorRecord)> = target
            .records
            .iter()
            .map(|record| (cosine_similarity(vector, &record.vector), record))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, record)| SearchResult {
                text: record.text.clone(),
                score,
                document_id: record.document_id.clone(),
                chunk_index: record.chunk_index,
                metadata: record.metadata.clone(),
            })
            .collect())
    }
}
