//! Meeting tools offered to participants during a turn
//!
//! - `records`: log_disagreement, log_consensus (write to the meeting store)
//! - `knowledge`: search_knowledge_base (retrieval over knowledge scopes)
//! - `web`: web_search (declared, not implemented)
//!
//! Which tools a participant sees is decided by the configured
//! [`ToolCatalog`], never by the orchestrator.

pub mod knowledge;
pub mod records;
pub mod web;

mod executor;

pub use executor::MeetingToolExecutor;

use sabha_domain::{ToolCatalog, ToolSpec};

/// Disagreement and consensus logging
pub fn default_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(records::log_disagreement_definition())
        .register(records::log_consensus_definition())
}

/// Every tool, knowledge search first
pub fn full_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(knowledge::search_knowledge_base_definition())
        .register(web::web_search_definition())
        .register(records::log_disagreement_definition())
        .register(records::log_consensus_definition())
}

pub fn tool_spec_for(catalog: ToolCatalog) -> ToolSpec {
    match catalog {
        ToolCatalog::Default => default_tool_spec(),
        ToolCatalog::Full => full_tool_spec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let default: Vec<_> = default_tool_spec().names().map(str::to_string).collect();
        assert_eq!(default, vec!["log_disagreement", "log_consensus"]);

        let full = tool_spec_for(ToolCatalog::Full);
        let names: Vec<_> = full.names().collect();
        assert_eq!(
            names,
            vec!["search_knowledge_base", "web_search", "log_disagreement", "log_consensus"]
        );
    }
}
