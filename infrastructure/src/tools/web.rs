//! Live web search (declared so models can ask for it; answers with a
//! not-implemented diagnostic)

use sabha_domain::{ToolDefinition, ToolParameter};

pub const WEB_SEARCH: &str = "web_search";

pub const NOT_IMPLEMENTED: &str =
    "Web search is not yet implemented. Please respond without this tool.";

pub fn web_search_definition() -> ToolDefinition {
    ToolDefinition::new(WEB_SEARCH, "Search the live internet for up-to-date information.")
        .with_parameter(ToolParameter::new("query", "Search keywords", true))
}
