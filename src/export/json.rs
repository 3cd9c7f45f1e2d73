// src/export/json.rs
// =============================================================================
// The JSON report: run summary first, then every classified channel.
//
// {
//   "timestamp": "...",
//   "total_channels": 5,
//   "valid_channels": 3,
//   "invalid_channels": 2,
//   "success_rate": 60.0,
//   "cancelled": false,
//   "valid_list": [...],
//   "invalid_list": [...]
// }
// =============================================================================

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::checker::ProbeOutcome;
use crate::engine::RunReport;
use crate::error::ExportError;

#[derive(Serialize)]
struct JsonReport<'a> {
    timestamp: DateTime<Local>,
    total_channels: usize,
    valid_channels: usize,
    invalid_channels: usize,
    success_rate: f64,
    cancelled: bool,
    valid_list: &'a [ProbeOutcome],
    invalid_list: &'a [ProbeOutcome],
}

impl<'a> From<&'a RunReport> for JsonReport<'a> {
    fn from(report: &'a RunReport) -> Self {
        let summary = &report.summary;
        Self {
            timestamp: summary.timestamp,
            total_channels: summary.total_channels,
            valid_channels: summary.valid_count,
            invalid_channels: summary.invalid_count,
            success_rate: summary.success_rate,
            cancelled: summary.cancelled,
            valid_list: &report.results.valid,
            invalid_list: &report.results.invalid,
        }
    }
}

pub(super) fn write_report<W: Write>(out: &mut W, report: &RunReport) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(out, &JsonReport::from(report))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ResultPartition, RunSummary};
    use crate::endpoint::Endpoint;

    #[test]
    fn test_report_fields() {
        let report = RunReport {
            summary: RunSummary {
                timestamp: Local::now(),
                total_channels: 1,
                completed: 1,
                valid_count: 0,
                invalid_count: 1,
                success_rate: 0.0,
                cancelled: false,
            },
            results: ResultPartition {
                valid: Vec::new(),
                invalid: vec![ProbeOutcome::fault(Endpoint::new("x", "http://x"), "timeout")],
            },
        };

        let mut buffer = Vec::new();
        write_report(&mut buffer, &report).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(json["total_channels"], 1);
        assert_eq!(json["invalid_channels"], 1);
        assert_eq!(json["success_rate"], 0.0);
        assert_eq!(json["invalid_list"][0]["error"], "timeout");
        assert_eq!(json["invalid_list"][0]["group"], "uncategorized");
        assert!(json["valid_list"].as_array().unwrap().is_empty());
    }
}
