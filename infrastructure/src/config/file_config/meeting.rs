//! Meeting configuration from TOML (`[meeting]` section)

use sabha_domain::{ConfigIssue, ConfigIssueCode, QuorumRule, ToolCatalog};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMeetingConfig {
    /// Tool catalog offered to participants: "default" or "full"
    pub tools: String,
    /// Rule deciding the end vote ("majority", "unanimous", "atleast:2", "75%")
    pub end_rule: String,
    /// Messages included in the vote digest
    pub vote_history: usize,
}

impl Default for FileMeetingConfig {
    fn default() -> Self {
        Self {
            tools: "default".to_string(),
            end_rule: "majority".to_string(),
            vote_history: 20,
        }
    }
}

impl FileMeetingConfig {
    pub fn parse_tools(&self) -> (ToolCatalog, Vec<ConfigIssue>) {
        match self.tools.parse() {
            Ok(catalog) => (catalog, Vec::new()),
            Err(e) => (
                ToolCatalog::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownToolCatalog,
                    format!("meeting.tools: {}, falling back to 'default'", e),
                )],
            ),
        }
    }

    pub fn parse_end_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.end_rule.parse() {
            Ok(rule) => (rule, Vec::new()),
            Err(e) => (
                QuorumRule::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEndRule,
                    format!("meeting.end_rule: {}, falling back to 'majority'", e),
                )],
            ),
        }
    }
}
