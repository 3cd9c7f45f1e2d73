// src/engine/events.rs
// =============================================================================
// Messages the engine sends to whoever is displaying a run.
//
// Every event is an owned, immutable value. The display side never reaches
// into engine state; it only reads what arrives on the channel.
// =============================================================================

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::checker::ProbeOutcome;

/// Running tallies after one more endpoint finished
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// completed / total * 100
    pub percent: f64,
}

/// Final tallies of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub timestamp: DateTime<Local>,
    pub total_channels: usize,
    pub completed: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// valid / total * 100, or 0 for an empty run
    pub success_rate: f64,
    /// The run was stopped before every endpoint was checked
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    Progress(ProgressSnapshot),
    /// One endpoint was classified, valid or invalid
    Classified(ProbeOutcome),
    /// Checking one endpoint failed for a reason unrelated to the network
    Error { message: String },
    /// Free-form status line, e.g. "cancelling..."
    Status(String),
    /// Last event of every run
    Completed(RunSummary),
}
