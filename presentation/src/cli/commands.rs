//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every turn, the vote tally and the summary
    Full,
    /// Only the executive summary
    Summary,
    /// The whole meeting record as JSON
    Json,
}

/// CLI arguments for sabha
#[derive(Parser, Debug)]
#[command(name = "sabha")]
#[command(author, version, about = "Moderated meetings between AI personas")]
#[command(long_about = r#"
Sabha seats a panel of AI personas (The Investor, The CTO, The Analyst) in a
meeting you moderate. Each persona answers in turn through its own model,
may log disagreements or consensus, and may search documents you provide.
When the discussion is over the panel votes on ending the meeting and an
executive summary is written.

Configuration files are loaded from (in priority order):
1. SABHA_* environment variables (use __ for nesting)
2. --config <path>     Explicit config file
3. ./sabha.toml        Project-level config
4. ~/.config/sabha/config.toml   Global config

Example:
  sabha meet --agenda "Q3 pricing" -m "Should we raise the Pro tier to $40?"
  sabha meet --agenda "Launch plan" -m "Go or no-go?" --rounds 2 --stream
  sabha meet --agenda "Q3 review" -k board.md --persona-knowledge analyst=q3.csv
  sabha config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a meeting with the default panel
    Meet(MeetArgs),
    /// Show configuration file locations and validation issues
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct MeetArgs {
    /// What the meeting is about
    #[arg(short, long)]
    pub agenda: String,

    /// Meeting name (defaults to the agenda)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Message from the moderator, posted before the first round (repeatable)
    #[arg(short, long = "message", value_name = "TEXT")]
    pub messages: Vec<String>,

    /// Number of rounds; every participant speaks once per round
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: u32,

    /// Print turns live as they are generated
    #[arg(short, long)]
    pub stream: bool,

    /// Plain-text document shared with the whole panel (repeatable)
    #[arg(short, long, value_name = "FILE")]
    pub knowledge: Vec<PathBuf>,

    /// Private document for one persona's knowledge stack (repeatable)
    #[arg(long, value_name = "ROLE=FILE", value_parser = parse_persona_file)]
    pub persona_knowledge: Vec<PersonaFile>,

    /// Default provider for this meeting (openrouter, ollama, gemini)
    #[arg(long)]
    pub provider: Option<String>,

    /// Default model for the chosen provider
    #[arg(long)]
    pub model: Option<String>,

    /// End without a vote
    #[arg(long, conflicts_with = "no_end")]
    pub force_end: bool,

    /// Leave the meeting open after the last round
    #[arg(long)]
    pub no_end: bool,

    /// Append a JSONL transcript of every model exchange to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,
}

/// A document bound for the stack of the persona with `role`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaFile {
    pub role: String,
    pub path: PathBuf,
}

fn parse_persona_file(value: &str) -> Result<PersonaFile, String> {
    match value.split_once('=') {
        Some((role, path)) if !role.trim().is_empty() && !path.trim().is_empty() => Ok(PersonaFile {
            role: role.trim().to_lowercase(),
            path: PathBuf::from(path.trim()),
        }),
        _ => Err(format!("expected ROLE=FILE, got '{}'", value)),
    }
}

impl MeetArgs {
    /// The meeting name, falling back to the agenda
    pub fn meeting_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.agenda)
    }

    /// Whether any document was given, shared or private
    pub fn uses_knowledge(&self) -> bool {
        !self.knowledge.is_empty() || !self.persona_knowledge.is_empty()
    }
}
