//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown provider: {0}. Valid: openrouter, ollama, gemini")]
    UnknownProvider(String),

    #[error("Invalid quorum rule: {0}")]
    InvalidRule(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_display() {
        let error = DomainError::UnknownProvider("anthropic".to_string());
        assert!(error.to_string().contains("anthropic"));
        assert!(error.to_string().contains("openrouter"));
    }

    #[test]
    fn test_invalid_rule_display() {
        let error = DomainError::InvalidRule("most".to_string());
        assert_eq!(error.to_string(), "Invalid quorum rule: most");
    }
}
