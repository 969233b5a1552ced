//! Presentation layer for sabha
//!
//! This crate contains CLI definitions, console formatters for turns, stream
//! events and vote tallies, and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, MeetArgs, OutputFormat, PersonaFile};
pub use output::console::ConsoleFormatter;
pub use output::report::MeetingReport;
pub use output::stream::{StreamOutcome, StreamRenderer, print_stream};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
