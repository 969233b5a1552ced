//! Lenient parsing of end-meeting vote replies.
//!
//! Models are asked for `{"vote": true|false, "reason": "..."}` but answer
//! with code fences, prose around the object, or string booleans. Parsing
//! never fails: anything unusable becomes a "no" vote carrying a diagnostic.

use crate::core::string::prefix_chars;
use serde_json::Value;

/// Parsed vote decision
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVote {
    pub approved: bool,
    pub reason: String,
}

/// Parse a vote reply into `(approved, reason)`.
///
/// # Examples
///
/// ```
/// use sabha_domain::quorum::parse_end_vote;
///
/// let vote = parse_end_vote("```json\n{\"vote\": true, \"reason\": \"Done\"}\n```");
/// assert!(vote.approved);
/// assert_eq!(vote.reason, "Done");
///
/// let vote = parse_end_vote("I think we should keep going");
/// assert!(!vote.approved);
/// assert!(vote.reason.starts_with("Could not parse vote response"));
/// ```
pub fn parse_end_vote(response: &str) -> ParsedVote {
    let parsed = candidate_json(response)
        .iter()
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .find_map(|value| vote_from_value(&value));

    parsed.unwrap_or_else(|| ParsedVote {
        approved: false,
        reason: format!(
            "Could not parse vote response: {}...",
            prefix_chars(response.trim(), 100)
        ),
    })
}

/// JSON candidates in preference order: fenced block, whole text, outermost braces.
fn candidate_json(response: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let trimmed = response.trim();

    if let Some(fenced) = extract_fenced(trimmed) {
        candidates.push(fenced);
    }
    candidates.push(trimmed.to_string());
    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
    {
        candidates.push(trimmed[start..=end].to_string());
    }

    candidates
}

fn extract_fenced(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

fn vote_from_value(value: &Value) -> Option<ParsedVote> {
    let approved = match value.get("vote")? {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "end" => true,
            "false" | "no" | "continue" => false,
            _ => return None,
        },
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => return None,
    };
    let reason = value
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("")
        .to_string();

    Some(ParsedVote { approved, reason })
}
