//! Progress reporting for the end-of-meeting vote and blocking turns

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sabha_application::EndMeetingProgress;
use sabha_domain::{Participant, Vote, VoteResult};
use std::sync::Mutex;
use std::time::Duration;

/// Reports vote progress with an indicatif bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self { bar: Mutex::new(None) }
    }

    fn vote_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Spinner shown while a participant's blocking turn is in flight
    pub fn turn_spinner(participant_name: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(participant_name.to_string());
        pb.set_message("is thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EndMeetingProgress for ProgressReporter {
    fn on_vote_start(&self, total_participants: usize) {
        let pb = ProgressBar::new(total_participants as u64);
        pb.set_style(Self::vote_style());
        pb.set_prefix("Voting");
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(100));

        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_vote_requested(&self, participant: &Participant) {
        self.with_bar(|pb| pb.set_message(format!("asking {}", participant.name)));
    }

    fn on_vote_cast(&self, vote: &Vote) {
        self.with_bar(|pb| {
            let status = if vote.approved {
                format!("{} {}", "v".green(), vote.participant_name)
            } else {
                format!("{} {}", "x".red(), vote.participant_name)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_vote_complete(&self, result: &VoteResult) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let verdict = if result.passed {
                "ending".green()
            } else {
                "continuing".yellow()
            };
            pb.finish_with_message(format!(
                "{}/{} approved, {}",
                result.approve_count, result.total_votes, verdict
            ));
        }
    }

    fn on_summary_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Summary");
        pb.set_message("Writing executive summary...");
        pb.enable_steady_tick(Duration::from_millis(100));

        // finished (and cleared) when the reporter is dropped
        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl EndMeetingProgress for SimpleProgress {
    fn on_vote_start(&self, total_participants: usize) {
        println!(
            "{} {} ({} participants)",
            "->".cyan(),
            "Voting on ending the meeting".bold(),
            total_participants
        );
    }

    fn on_vote_cast(&self, vote: &Vote) {
        if vote.approved {
            println!("  {} {}", "v".green(), vote.participant_name);
        } else {
            println!("  {} {} ({})", "x".red(), vote.participant_name, vote.reason);
        }
    }

    fn on_vote_complete(&self, _result: &VoteResult) {
        println!();
    }

    fn on_summary_start(&self) {
        println!("{} {}", "->".cyan(), "Writing executive summary".bold());
    }
}
