//! Live rendering of a streaming turn

use colored::Colorize;
use futures::StreamExt;
use sabha_application::EventStream;
use sabha_domain::{StreamEvent, Usage};
use std::io::{self, Write};

/// How a rendered stream ended
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    Done {
        usage: Usage,
        message_id: Option<String>,
    },
    Failed(String),
}

/// Turns stream events into terminal text.
///
/// Reasoning is dimmed and set apart from the answer; the renderer tracks
/// which of the two it is in so the separator is printed once per switch.
#[derive(Debug)]
pub struct StreamRenderer {
    in_reasoning: bool,
    at_line_start: bool,
}

impl StreamRenderer {
    pub fn new() -> Self {
        Self {
            in_reasoning: false,
            at_line_start: true,
        }
    }

    /// Label printed before a participant starts speaking
    pub fn speaker(name: &str) -> String {
        format!("\n{}\n", format!("── {} ──", name).yellow().bold())
    }

    pub fn render(&mut self, event: &StreamEvent) -> String {
        match event {
            StreamEvent::ReasoningDelta { text } => {
                let mut out = String::new();
                if !self.in_reasoning {
                    self.in_reasoning = true;
                    out.push_str(&format!("{}", "thinking: ".dimmed().italic()));
                }
                out.push_str(&format!("{}", text.dimmed()));
                self.track(text);
                out
            }
            StreamEvent::TextDelta { text } => {
                let mut out = String::new();
                if self.in_reasoning {
                    self.in_reasoning = false;
                    out.push_str(self.break_line());
                }
                out.push_str(text);
                self.track(text);
                out
            }
            StreamEvent::ToolCall { call } => {
                let out = format!("{}{}\n", self.break_line(), format!("[tool] {}", call.name).cyan());
                self.at_line_start = true;
                out
            }
            StreamEvent::ToolResult { output, .. } => {
                let first_line = output.lines().next().unwrap_or_default();
                self.at_line_start = true;
                format!("{}\n", format!("  -> {}", first_line).dimmed())
            }
            StreamEvent::Citation { citation } => {
                let name = citation.title.as_deref().unwrap_or(&citation.source);
                let out = format!("{}{}\n", self.break_line(), format!("[source] {}", name).dimmed());
                self.at_line_start = true;
                out
            }
            StreamEvent::Done { usage, .. } => {
                let mut out = self.break_line().to_string();
                if !usage.is_empty() {
                    out.push_str(&format!(
                        "{}\n",
                        format!("({} tokens in, {} out)", usage.prompt_tokens, usage.completion_tokens)
                            .dimmed()
                    ));
                }
                self.reset();
                out
            }
            StreamEvent::Error { message } => {
                let out = format!("{}{} {}\n", self.break_line(), "error:".red().bold(), message);
                self.reset();
                out
            }
        }
    }

    fn break_line(&self) -> &'static str {
        if self.at_line_start { "" } else { "\n" }
    }

    fn track(&mut self, text: &str) {
        if !text.is_empty() {
            self.at_line_start = text.ends_with('\n');
        }
    }

    fn reset(&mut self) {
        self.in_reasoning = false;
        self.at_line_start = true;
    }
}

impl Default for StreamRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a turn stream into `out`, flushing after every event
pub async fn print_stream<W: Write>(mut stream: EventStream<'_>, out: &mut W) -> io::Result<StreamOutcome> {
    let mut renderer = StreamRenderer::new();
    let mut outcome = StreamOutcome::Failed("stream ended without a terminal event".to_string());

    while let Some(event) = stream.next().await {
        write!(out, "{}", renderer.render(&event))?;
        out.flush()?;
        match event {
            StreamEvent::Done { usage, message_id } => {
                outcome = StreamOutcome::Done { usage, message_id };
                break;
            }
            StreamEvent::Error { message } => {
                outcome = StreamOutcome::Failed(message);
                break;
            }
            _ => {}
        }
    }

    Ok(outcome)
}
