//! Disagreement and consensus records

use sabha_domain::{ParamType, ToolDefinition, ToolParameter};

pub const LOG_DISAGREEMENT: &str = "log_disagreement";
pub const LOG_CONSENSUS: &str = "log_consensus";

/// Rating used when a model omits severity or strength
pub const DEFAULT_RATING: u8 = 3;

pub fn log_disagreement_definition() -> ToolDefinition {
    ToolDefinition::new(
        LOG_DISAGREEMENT,
        "Log a formal disagreement with another participant. Use this when you fundamentally oppose a point.",
    )
    .with_parameter(ToolParameter::new(
        "target_participant_name",
        "Name of the AI or User you disagree with.",
        true,
    ))
    .with_parameter(ToolParameter::new(
        "topic",
        "Short summary of the conflict (max 5 words).",
        true,
    ))
    .with_parameter(ToolParameter::new("reasoning", "Why you disagree.", true))
    .with_parameter(
        ToolParameter::new(
            "severity",
            "1 (Minor nitpick) to 5 (Critical blocker/Fundamental flaw).",
            false,
        )
        .with_type(ParamType::Integer)
        .with_range(1, 5),
    )
}

pub fn log_consensus_definition() -> ToolDefinition {
    ToolDefinition::new(
        LOG_CONSENSUS,
        "Log a point where multiple participants have reached alignment.",
    )
    .with_parameter(
        ToolParameter::new("participants", "List of names who agree.", true)
            .with_type(ParamType::Array),
    )
    .with_parameter(ToolParameter::new("topic", "What was agreed upon.", true))
    .with_parameter(
        ToolParameter::new("strength", "1 (Tentative) to 5 (Unanimous/Strong).", false)
            .with_type(ParamType::Integer)
            .with_range(1, 5),
    )
}
