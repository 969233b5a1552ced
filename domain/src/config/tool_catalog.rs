use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which tools participants are offered during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCatalog {
    /// Disagreement and consensus logging only
    #[default]
    Default,
    /// Adds knowledge search and the web search stub
    Full,
}

impl ToolCatalog {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCatalog::Default => "default",
            ToolCatalog::Full => "full",
        }
    }
}

impl std::fmt::Display for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCatalog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ToolCatalog::Default),
            "full" | "all" => Ok(ToolCatalog::Full),
            other => Err(format!("Unknown tool catalog: {}. Valid: default, full", other)),
        }
    }
}
