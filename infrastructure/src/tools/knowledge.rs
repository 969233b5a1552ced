//! Knowledge search over the meeting's shared documents and the caller's
//! private documents

use sabha_domain::{SearchResult, ToolDefinition, ToolParameter, truncate_chars};

pub const SEARCH_KNOWLEDGE_BASE: &str = "search_knowledge_base";

/// Passages returned to the model per search
pub const MAX_RESULTS: usize = 5;

const MAX_PASSAGE_CHARS: usize = 800;

pub const NO_KNOWLEDGE_BASE: &str =
    "No knowledge base is available to search. Answer from the discussion and your own expertise.";

pub fn search_knowledge_base_definition() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_KNOWLEDGE_BASE,
        "Search for documents, reports, or files uploaded to the meeting context or your private stack.",
    )
    .with_parameter(ToolParameter::new(
        "query",
        "Semantic search query (e.g., 'Competitor pricing 2024')",
        true,
    ))
}

pub fn no_results(query: &str) -> String {
    format!("No relevant passages found for: {}", query)
}

/// Render results as an enumerated block:
///
/// ```text
/// [1] (score 0.87, source doc-1 #3) passage text
/// ```
pub fn format_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] (score {:.2}, source {} #{}) {}",
                i + 1,
                r.score,
                r.document_id,
                r.chunk_index,
                truncate_chars(r.text.trim(), MAX_PASSAGE_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
