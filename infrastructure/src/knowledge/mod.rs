//! In-process knowledge backends: a cosine-similarity vector index and a
//! scope registry mapping meetings and participants to collections.

pub mod memory_index;
pub mod scopes;

pub use memory_index::InMemoryVectorIndex;
pub use scopes::InMemoryKnowledgeScopes;
