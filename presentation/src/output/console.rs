//! Console output formatter for meetings

use super::report::MeetingReport;
use colored::Colorize;
use sabha_application::EndMeetingOutput;
use sabha_domain::{
    Citation, ConfigIssue, Consensus, Disagreement, Meeting, MeetingMessage, Participant, SenderType,
    Severity, TurnResult, VoteResult,
};
use std::path::PathBuf;

/// Formats meetings for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed when a meeting opens
    pub fn meeting_header(meeting: &Meeting, participants: &[Participant]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&meeting.name));
        output.push('\n');
        if !meeting.agenda.trim().is_empty() {
            output.push_str(&format!("{} {}\n", "Agenda:".cyan().bold(), meeting.agenda));
        }
        output.push_str(&format!("{}\n", "Panel:".cyan().bold()));
        for participant in participants {
            output.push_str(&format!(
                "  * {} {}\n",
                participant.name.bold(),
                format!("({})", participant.role).dimmed()
            ));
        }

        output
    }

    /// One transcript message with its reasoning and sources
    pub fn message(message: &MeetingMessage) -> String {
        let mut output = String::new();

        let label = format!("── {} ──", Self::sender_label(message));
        let label = match message.sender_type {
            SenderType::Ai => label.yellow().bold(),
            SenderType::User => label.cyan().bold(),
            SenderType::System => label.dimmed(),
        };
        output.push_str(&format!("\n{}\n", label));

        if let Some(thinking) = &message.thinking {
            output.push_str(&format!("{}\n", Self::indent(thinking, "  │ ").dimmed()));
        }
        output.push_str(&message.content);
        output.push('\n');

        if !message.citations.is_empty() {
            output.push_str(&format!("{}\n", "Sources:".dimmed()));
            for (i, citation) in message.citations.iter().enumerate() {
                output.push_str(&format!("  {}\n", Self::citation(i + 1, citation).dimmed()));
            }
        }
        if message.estimated_cost > 0.0 {
            output.push_str(&format!("{}\n", format!("(${:.4})", message.estimated_cost).dimmed()));
        }

        output
    }

    /// A completed turn: the message plus anything it logged
    pub fn turn(result: &TurnResult) -> String {
        let mut output = Self::message(&result.message);
        for disagreement in &result.disagreements {
            output.push_str(&Self::disagreement(disagreement));
        }
        for consensus in &result.consensus {
            output.push_str(&Self::consensus(consensus));
        }
        output
    }

    pub fn disagreement(disagreement: &Disagreement) -> String {
        format!(
            "{} {} disagrees with {} on {} (severity {}/5)\n",
            "!".red().bold(),
            "Disagreement:".red(),
            disagreement.target_name.bold(),
            disagreement.topic,
            disagreement.severity
        )
    }

    pub fn consensus(consensus: &Consensus) -> String {
        let who = if consensus.participants.is_empty() {
            String::new()
        } else {
            format!(" [{}]", consensus.participants.join(", "))
        };
        format!(
            "{} {} {} (strength {}/5){}\n",
            "=".green().bold(),
            "Consensus:".green(),
            consensus.topic,
            consensus.strength,
            who
        )
    }

    /// One line per vote and the overall tally
    pub fn vote_tally(result: &VoteResult) -> String {
        let mut output = Self::section_header("End-of-meeting vote");

        for vote in &result.votes {
            let mark = if vote.approved { "v".green() } else { "x".red() };
            output.push_str(&format!(
                "  {} {}: {}\n",
                mark,
                vote.participant_name.bold(),
                vote.reason
            ));
        }

        let tally = format!(
            "{} {}/{} in favour of ending, {} against",
            result.vote_summary(),
            result.approve_count,
            result.total_votes,
            result.reject_count()
        );
        let verdict = if result.passed {
            format!("{}: meeting ends", tally).green().bold()
        } else {
            format!("{}: meeting continues", tally).yellow().bold()
        };
        output.push_str(&format!("\n{}\n", verdict));

        output
    }

    /// Vote tally (when a vote ran), outcome and summary
    pub fn end_outcome(outcome: &EndMeetingOutput) -> String {
        let mut output = String::new();

        if let Some(result) = &outcome.result {
            output.push_str(&Self::vote_tally(result));
        }
        if let Some(summary) = &outcome.summary {
            output.push_str(&Self::section_header("Executive Summary"));
            output.push('\n');
            output.push_str(summary);
            output.push('\n');
        } else {
            output.push_str(&format!("\n{}\n", outcome.message));
        }
        output.push_str(&Self::footer());

        output
    }

    /// Summary only (concise output)
    pub fn format_summary_only(report: &MeetingReport) -> String {
        let mut output = format!("{}\n\n", format!("=== {} ===", report.meeting.name).cyan().bold());

        match &report.summary {
            Some(summary) => output.push_str(summary),
            None if report.ended => output.push_str("The meeting ended without a summary."),
            None => output.push_str("The meeting is still open."),
        }
        output.push('\n');
        output.push_str(&format!(
            "\n{}\n",
            format!("Total cost: ${:.4}", report.meeting.total_cost).dimmed()
        ));

        output
    }

    /// Where configuration was (or would be) read from
    pub fn config_sources(sources: &[(String, Option<PathBuf>)]) -> String {
        let mut output = format!("{}\n", "Configuration sources:".cyan().bold());
        for (label, path) in sources {
            let location = match path {
                Some(path) => path.display().to_string().green(),
                None => "(not found)".dimmed(),
            };
            output.push_str(&format!("  {:<10} {}\n", format!("{}:", label), location));
        }
        output
    }

    pub fn config_issues(issues: &[ConfigIssue]) -> String {
        if issues.is_empty() {
            return format!("{}\n", "Configuration is valid.".green());
        }
        let mut output = String::new();
        for issue in issues {
            let tag = match issue.severity {
                Severity::Error => "error:".red().bold(),
                Severity::Warning => "warning:".yellow().bold(),
            };
            output.push_str(&format!("{} {}\n", tag, issue.message));
        }
        output
    }

    fn sender_label(message: &MeetingMessage) -> &str {
        match message.sender_type {
            SenderType::User => "Moderator",
            _ => &message.sender_name,
        }
    }

    fn citation(index: usize, citation: &Citation) -> String {
        let name = citation.title.as_deref().unwrap_or(&citation.source);
        match citation.score {
            Some(score) => format!("[{}] {} ({:.2})", index, name, score),
            None => format!("[{}] {}", index, name),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sabha_domain::{ConfigIssueCode, MeetingStatus, Vote};

    fn ai_message(content: &str) -> MeetingMessage {
        MeetingMessage {
            id: "msg-1".into(),
            meeting_id: "m1".into(),
            sender_type: SenderType::Ai,
            sender_id: Some("p1".into()),
            sender_name: "The CTO".into(),
            content: content.into(),
            thinking: None,
            citations: Vec::new(),
            tool_artifacts: Vec::new(),
            estimated_cost: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_shows_thinking_and_sources() {
        let mut message = ai_message("Ship it behind a flag.");
        message.thinking = Some("risk is low\nrollback is easy".into());
        message.citations = vec![Citation {
            source: "doc-1".into(),
            title: Some("Launch plan".into()),
            snippet: "rollout".into(),
            score: Some(0.87),
        }];

        let output = ConsoleFormatter::message(&message);

        assert!(output.contains("The CTO"));
        assert!(output.contains("  │ rollback is easy"));
        assert!(output.contains("Ship it behind a flag."));
        assert!(output.contains("[1] Launch plan (0.87)"));
    }

    #[test]
    fn test_user_message_is_labelled_moderator() {
        let mut message = ai_message("Go or no-go?");
        message.sender_type = SenderType::User;
        message.sender_name = "User".into();

        assert!(ConsoleFormatter::message(&message).contains("Moderator"));
    }

    #[test]
    fn test_turn_lists_logged_positions() {
        let result = TurnResult {
            message: ai_message("[The CTO used tools: log_disagreement]"),
            disagreements: vec![Disagreement {
                id: "d1".into(),
                meeting_id: "m1".into(),
                source_participant_id: "p1".into(),
                target_name: "The Investor".into(),
                topic: "hiring pace".into(),
                reasoning: "burn".into(),
                severity: 4,
                status: Default::default(),
                created_at: Utc::now(),
            }],
            consensus: Vec::new(),
        };

        let output = ConsoleFormatter::turn(&result);

        assert!(output.contains("The Investor"));
        assert!(output.contains("hiring pace (severity 4/5)"));
    }

    #[test]
    fn test_vote_tally() {
        let result = VoteResult {
            passed: true,
            approve_count: 2,
            total_votes: 3,
            votes: vec![
                Vote::approve("p1", "The Investor", "Covered."),
                Vote::approve("p2", "The CTO", "Done."),
                Vote::reject("p3", "The Analyst", "Vote unavailable: timeout"),
            ],
        };

        let output = ConsoleFormatter::vote_tally(&result);

        assert!(output.contains("The Analyst"));
        assert!(output.contains("Vote unavailable: timeout"));
        assert!(output.contains("[●●○] 2/3 in favour of ending, 1 against: meeting ends"));
    }

    #[test]
    fn test_end_outcome_without_summary_prints_message() {
        let outcome = EndMeetingOutput {
            ended: false,
            votes: Vec::new(),
            result: None,
            summary: None,
            message: "Meeting continues".into(),
        };

        assert!(ConsoleFormatter::end_outcome(&outcome).contains("Meeting continues"));
    }

    #[test]
    fn test_summary_only_for_open_meeting() {
        let report = MeetingReport {
            meeting: Meeting {
                id: "m1".into(),
                name: "Pricing".into(),
                agenda: String::new(),
                status: MeetingStatus::Active,
                total_cost: 0.0123,
                created_at: Utc::now(),
            },
            participants: Vec::new(),
            messages: Vec::new(),
            disagreements: Vec::new(),
            consensus: Vec::new(),
            ended: false,
            vote: None,
            summary: None,
        };

        let output = ConsoleFormatter::format_summary_only(&report);

        assert!(output.contains("still open"));
        assert!(output.contains("$0.0123"));
        assert!(report.to_json().contains("\"name\": \"Pricing\""));
        assert!(!report.to_json().contains("\"summary\""));
    }

    #[test]
    fn test_config_issues() {
        assert!(ConsoleFormatter::config_issues(&[]).contains("valid"));

        let output = ConsoleFormatter::config_issues(&[ConfigIssue::warning(
            ConfigIssueCode::UnknownToolCatalog,
            "unknown tools 'all', falling back to 'default'",
        )]);
        assert!(output.contains("warning:"));
        assert!(output.contains("falling back to 'default'"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
