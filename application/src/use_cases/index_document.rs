//! Index a plain-text document into a knowledge scope.

use crate::ports::knowledge::{EmbeddingProvider, KnowledgeError, VectorIndex, VectorRecord};
use sabha_domain::{ChunkingOptions, KnowledgeScope, chunk_text};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct IndexDocumentInput {
    pub scope: KnowledgeScope,
    pub document_id: String,
    pub title: Option<String>,
    pub text: String,
    pub chunking: ChunkingOptions,
}

impl IndexDocumentInput {
    pub fn new(scope: KnowledgeScope, document_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            scope,
            document_id: document_id.into(),
            title: None,
            text: text.into(),
            chunking: ChunkingOptions::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexStatus {
    Indexed,
    /// The document had no indexable text
    Empty,
    Failed(String),
}

/// Outcome of indexing; failures are reported here rather than raised
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub document_id: String,
    pub collection: String,
    pub chunks: usize,
    pub status: IndexStatus,
}

pub struct IndexDocumentUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl IndexDocumentUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub async fn execute(&self, input: IndexDocumentInput) -> IndexReport {
        let collection = input.scope.collection_name();
        let chunks = chunk_text(&input.text, input.chunking);

        let mut report = IndexReport {
            document_id: input.document_id.clone(),
            collection: collection.clone(),
            chunks: chunks.len(),
            status: IndexStatus::Empty,
        };
        if chunks.is_empty() {
            return report;
        }

        report.status = match self.index_chunks(&input, &collection, chunks).await {
            Ok(written) => {
                info!(
                    document = %input.document_id,
                    collection = %collection,
                    chunks = written,
                    "Document indexed"
                );
                IndexStatus::Indexed
            }
            Err(e) => {
                warn!(document = %input.document_id, error = %e, "Indexing failed");
                IndexStatus::Failed(e.to_string())
            }
        };
        report
    }

    async fn index_chunks(
        &self,
        input: &IndexDocumentInput,
        collection: &str,
        chunks: Vec<String>,
    ) -> Result<usize, KnowledgeError> {
        let dimension = self.embedder.dimension();
        match self.index.collection_dimension(collection).await? {
            Some(existing) if existing != dimension => {
                return Err(KnowledgeError::DimensionMismatch {
                    collection: collection.to_string(),
                    expected: existing,
                    actual: dimension,
                });
            }
            Some(_) => {}
            None => self.index.create_collection(collection, dimension).await?,
        }

        let vectors = self.embedder.embed_batch(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(KnowledgeError::Embedding(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let records = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (text, vector))| {
                let mut metadata = HashMap::new();
                if let Some(title) = &input.title {
                    metadata.insert("title".to_string(), json!(title));
                }
                VectorRecord {
                    id: format!("{}:{}", input.document_id, chunk_index),
                    vector,
                    text,
                    document_id: input.document_id.clone(),
                    chunk_index,
                    metadata,
                }
            })
            .collect();

        self.index.upsert(collection, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FixedEmbedder, StaticIndex};

    #[tokio::test]
    async fn test_document_indexed_into_scope_collection() {
        let index = Arc::new(StaticIndex::new());
        let use_case = IndexDocumentUseCase::new(Arc::new(FixedEmbedder::new(3)), index.clone());

        let report = use_case
            .execute(
                IndexDocumentInput::new(KnowledgeScope::Meeting("m1".into()), "doc-1", "CAC is $120.")
                    .with_title("Unit economics"),
            )
            .await;

        assert_eq!(report.status, IndexStatus::Indexed);
        assert_eq!(report.collection, "meeting_m1_shared");
        assert_eq!(report.chunks, 1);
        assert_eq!(index.record_count("meeting_m1_shared"), 1);
    }

    #[tokio::test]
    async fn test_blank_document_is_empty() {
        let use_case =
            IndexDocumentUseCase::new(Arc::new(FixedEmbedder::new(3)), Arc::new(StaticIndex::new()));
        let report = use_case
            .execute(IndexDocumentInput::new(KnowledgeScope::Stack("analyst".into()), "d", "  "))
            .await;
        assert_eq!(report.status, IndexStatus::Empty);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_reported_not_raised() {
        let index = StaticIndex::new().with_collection("meeting_m1_shared", 768, vec![]);
        let use_case = IndexDocumentUseCase::new(Arc::new(FixedEmbedder::new(3)), Arc::new(index));

        let report = use_case
            .execute(IndexDocumentInput::new(KnowledgeScope::Meeting("m1".into()), "d", "text"))
            .await;

        assert!(matches!(report.status, IndexStatus::Failed(ref m) if m.contains("Dimension mismatch")));
    }
}
