//! Retrieval across several similarity collections.
//!
//! The query is embedded once, each collection is searched for its own top
//! `limit`, and the union is ordered by descending score before truncation.
//! Truncating only after the merge is what makes the result the global top
//! `limit` rather than a per-collection interleave.

use crate::ports::knowledge::{EmbeddingProvider, KnowledgeError, VectorIndex};
use sabha_domain::SearchResult;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RetrievalMerger {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl RetrievalMerger {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Search `collections` and return at most `limit` results overall.
    ///
    /// Missing collections contribute nothing. Collections whose stored
    /// dimension differs from the embedder's are skipped: their vectors live
    /// in a different embedding space and their scores are not comparable.
    pub async fn search_multiple_collections(
        &self,
        collections: &[String],
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, KnowledgeError> {
        if collections.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed_text(query).await?;
        let mut merged = Vec::new();

        for collection in collections {
            match self.index.collection_dimension(collection).await? {
                None => {
                    debug!(collection = %collection, "Collection does not exist, skipping");
                    continue;
                }
                Some(dimension) if dimension != vector.len() => {
                    warn!(
                        collection = %collection,
                        expected = vector.len(),
                        actual = dimension,
                        embedder = %self.embedder.name(),
                        "Embedding dimension mismatch, skipping collection"
                    );
                    continue;
                }
                Some(_) => {}
            }

            let results = self.index.search(collection, &vector, limit).await?;
            debug!(collection = %collection, hits = results.len(), "Collection searched");
            merged.extend(results);
        }

        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged.truncate(limit);
        Ok(merged)
    }
}
