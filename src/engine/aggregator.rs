// src/engine/aggregator.rs
// =============================================================================
// The single consumer of finished probes.
//
// The aggregator owns RunState and both result lists outright. Probes finish
// on many futures at once, but their outcomes reach this struct one at a time
// through a channel, so none of the counters need a lock.
//
// For every outcome it:
// 1. bumps the counters
// 2. appends the outcome to the valid or invalid list
// 3. sends a progress snapshot
// 4. sends a classification event
// =============================================================================

use chrono::Local;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use super::events::{ProgressSnapshot, RunEvent, RunSummary};
use crate::checker::ProbeOutcome;

/// Counters of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub total: usize,
    pub completed: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub cancelled: bool,
}

impl RunState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn percent(&self) -> f64 {
        ratio(self.completed, self.total)
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.valid_count, self.total)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            valid_count: self.valid_count,
            invalid_count: self.invalid_count,
            percent: self.percent(),
        }
    }
}

// part / whole * 100, with an empty whole counting as 0%
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Valid and invalid outcomes in completion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultPartition {
    pub valid: Vec<ProbeOutcome>,
    pub invalid: Vec<ProbeOutcome>,
}

impl ResultPartition {
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a finished run produced. Frozen: exporters only read it.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    #[serde(flatten)]
    pub results: ResultPartition,
}

#[derive(Debug)]
pub struct Aggregator {
    state: RunState,
    results: ResultPartition,
    events: UnboundedSender<RunEvent>,
}

impl Aggregator {
    pub fn new(total: usize, events: UnboundedSender<RunEvent>) -> Self {
        Self {
            state: RunState::new(total),
            results: ResultPartition::default(),
            events,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn results(&self) -> &ResultPartition {
        &self.results
    }

    /// Records one finished endpoint
    pub fn record(&mut self, outcome: ProbeOutcome) {
        self.state.completed += 1;
        if outcome.is_valid() {
            self.state.valid_count += 1;
            self.results.valid.push(outcome.clone());
        } else {
            self.state.invalid_count += 1;
            self.results.invalid.push(outcome.clone());
        }

        debug!(
            completed = self.state.completed,
            total = self.state.total,
            name = %outcome.endpoint.name,
            valid = outcome.is_valid(),
            "endpoint classified"
        );

        self.emit(RunEvent::Progress(self.state.snapshot()));
        self.emit(RunEvent::Classified(outcome));
    }

    /// Records an endpoint whose check failed unexpectedly. The failure is
    /// reported as an error event and the endpoint counts as invalid.
    pub fn record_fault(&mut self, outcome: ProbeOutcome, message: String) {
        self.emit(RunEvent::Error { message });
        self.record(outcome);
    }

    /// Computes the final tallies and sends the completion event
    pub fn finish(mut self, cancelled: bool) -> RunReport {
        self.state.cancelled = cancelled;

        let summary = RunSummary {
            timestamp: Local::now(),
            total_channels: self.state.total,
            completed: self.state.completed,
            valid_count: self.state.valid_count,
            invalid_count: self.state.invalid_count,
            success_rate: self.state.success_rate(),
            cancelled,
        };

        info!(
            total = summary.total_channels,
            completed = summary.completed,
            valid = summary.valid_count,
            invalid = summary.invalid_count,
            cancelled,
            "run complete"
        );

        self.emit(RunEvent::Completed(summary.clone()));

        RunReport {
            summary,
            results: self.results,
        }
    }

    // A closed receiver just means nobody is watching; the run carries on.
    fn emit(&self, event: RunEvent) {
        let _ = self.events.send(event);
    }
}
