// src/console.rs
// =============================================================================
// The terminal front end of a run.
//
// The engine pushes events into a channel; this module drains that channel
// every 100 ms and prints what it finds:
// - a progress line (rewritten in place on stderr)
// - every invalid channel, and valid ones too with --detailed
// - error and status lines
// - a summary table or JSON once the run is over
//
// Nothing here touches engine state. It only reads events and the final
// RunReport.
// =============================================================================

use std::io::Write;
use std::time::Duration;

use anyhow::Result;

use crate::checker::ProbeOutcome;
use crate::engine::{ProgressSnapshot, RunEvent, RunHandle, RunReport, RunSummary};

/// How often queued events are drained and printed
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// Width of the progress line, used to blank it out before other output
const PROGRESS_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    /// Also print valid channels as they are classified
    detailed: bool,
}

impl ConsoleReporter {
    pub fn new(detailed: bool) -> Self {
        Self { detailed }
    }

    /// Prints events until the run reports completion.
    ///
    /// Returns the summary from the completion event, or `None` if the run
    /// ended without one (its task failed).
    pub async fn follow(&self, handle: &mut RunHandle) -> Option<RunSummary> {
        let mut ticker = tokio::time::interval(DRAIN_INTERVAL);

        loop {
            ticker.tick().await;

            // Checked before draining so that events queued just before
            // the task ended are still printed.
            let finished = handle.is_finished();

            while let Some(event) = handle.try_next_event() {
                if let Some(summary) = self.render(event) {
                    return Some(summary);
                }
            }

            if finished {
                clear_progress();
                return None;
            }
        }
    }

    // Prints one event; returns the summary when it was the last one
    fn render(&self, event: RunEvent) -> Option<RunSummary> {
        match event {
            RunEvent::Progress(snapshot) => print_progress(&snapshot),
            RunEvent::Classified(outcome) => {
                if let Some(line) = self.classification_line(&outcome) {
                    clear_progress();
                    println!("{line}");
                }
            }
            RunEvent::Error { message } => {
                clear_progress();
                println!("⚠️  {message}");
            }
            RunEvent::Status(text) => {
                clear_progress();
                println!("⏳ {text}");
            }
            RunEvent::Completed(summary) => {
                clear_progress();
                return Some(summary);
            }
        }
        None
    }

    fn classification_line(&self, outcome: &ProbeOutcome) -> Option<String> {
        let name = &outcome.endpoint.name;
        if outcome.is_valid() {
            self.detailed.then(|| format!("✅ {name} - ok"))
        } else {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            Some(format!("❌ {name} - {reason}"))
        }
    }
}

fn progress_line(snapshot: &ProgressSnapshot) -> String {
    format!(
        "[{:5.1}%] {}/{} | valid: {} | invalid: {}",
        snapshot.percent,
        snapshot.completed,
        snapshot.total,
        snapshot.valid_count,
        snapshot.invalid_count
    )
}

fn print_progress(snapshot: &ProgressSnapshot) {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{:<width$}", progress_line(snapshot), width = PROGRESS_WIDTH);
    let _ = stderr.flush();
}

fn clear_progress() {
    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r{:width$}\r", "", width = PROGRESS_WIDTH);
    let _ = stderr.flush();
}

/// Prints the final results either as a table or JSON
pub fn print_results(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints invalid channels as a table, then the summary
fn print_table(report: &RunReport) {
    let invalid = &report.results.invalid;

    if !invalid.is_empty() {
        println!();
        println!("{:<30} {:<60} {:<30}", "CHANNEL", "URL", "REASON");
        println!("{}", "=".repeat(120));

        for outcome in invalid {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            println!(
                "{:<30} {:<60} {:<30}",
                truncate(&outcome.endpoint.name, 30),
                truncate(&outcome.endpoint.url, 60),
                reason
            );
        }
    }

    let summary = &report.summary;
    println!();
    if summary.cancelled {
        println!("🛑 Check stopped early");
    }
    println!("📊 Summary:");
    println!("   📋 Total: {}", summary.total_channels);
    println!("   🔎 Checked: {}", summary.completed);
    println!("   ✅ Valid: {}", summary.valid_count);
    println!("   ❌ Invalid: {}", summary.invalid_count);
    println!("   📈 Success rate: {:.1}%", summary.success_rate);
}

// Shortens text to `width` characters, marking the cut with "..."
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
