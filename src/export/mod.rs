// src/export/mod.rs
// =============================================================================
// Writes the results of a finished run to disk.
//
// Files written into the target directory (TS = run timestamp):
// - valid_TS.csv    name,url,group          (only if there are valid channels)
// - valid_TS.m3u    playable playlist       (only if there are valid channels)
// - invalid_TS.csv  name,url,group,error    (only if there are invalid ones)
// - report_TS.json  summary plus both lists
//
// Exporting only reads the RunReport. If a write fails the report is still
// intact and the export can be retried into another directory.
// =============================================================================

mod json;
mod m3u;
mod tables;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::engine::RunReport;
use crate::error::ExportError;

/// Paths of the files one export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPaths {
    pub valid_csv: Option<PathBuf>,
    pub valid_m3u: Option<PathBuf>,
    pub invalid_csv: Option<PathBuf>,
    pub report_json: PathBuf,
}

impl ExportPaths {
    pub fn all(&self) -> Vec<&Path> {
        [&self.valid_csv, &self.valid_m3u, &self.invalid_csv]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .chain(std::iter::once(self.report_json.as_path()))
            .collect()
    }
}

/// Writes every export file for `report` into `dir`, creating it if needed
pub fn export_all(report: &RunReport, dir: &Path) -> Result<ExportPaths, ExportError> {
    if report.results.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let stamp = report.summary.timestamp.format("%Y%m%d_%H%M%S").to_string();
    let mut paths = ExportPaths {
        report_json: dir.join(format!("report_{stamp}.json")),
        ..ExportPaths::default()
    };

    if !report.results.valid.is_empty() {
        let csv_path = dir.join(format!("valid_{stamp}.csv"));
        write_file(&csv_path, |out| tables::write_valid(out, &report.results.valid))?;
        paths.valid_csv = Some(csv_path);

        let m3u_path = dir.join(format!("valid_{stamp}.m3u"));
        write_file(&m3u_path, |out| {
            m3u::write_playlist(out, &report.results.valid).map_err(|source| ExportError::Io {
                path: m3u_path.clone(),
                source,
            })
        })?;
        paths.valid_m3u = Some(m3u_path);
    }

    if !report.results.invalid.is_empty() {
        let csv_path = dir.join(format!("invalid_{stamp}.csv"));
        write_file(&csv_path, |out| tables::write_invalid(out, &report.results.invalid))?;
        paths.invalid_csv = Some(csv_path);
    }

    write_file(&paths.report_json, |out| json::write_report(out, report))?;

    info!(dir = %dir.display(), files = paths.all().len(), "results exported");
    Ok(paths)
}

// Creates `path`, hands a buffered writer to `body` and flushes it
fn write_file<F>(path: &Path, body: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    body(&mut out)?;
    out.flush().map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{ProbeOutcome, Verdict};
    use crate::endpoint::Endpoint;
    use crate::engine::{ResultPartition, RunSummary};
    use chrono::{Local, TimeZone};

    fn outcome(name: &str, verdict: Verdict) -> ProbeOutcome {
        ProbeOutcome {
            endpoint: Endpoint::new(name, format!("http://example.com/{name}")).with_group("News"),
            verdict,
            http_status: Some(if verdict == Verdict::Valid { 200 } else { 404 }),
            error: (verdict == Verdict::Invalid).then(|| "HTTP 404".to_string()),
            latency_ms: Some(12),
        }
    }

    fn report(valid: usize, invalid: usize) -> RunReport {
        let results = ResultPartition {
            valid: (0..valid).map(|i| outcome(&format!("ok{i}"), Verdict::Valid)).collect(),
            invalid: (0..invalid).map(|i| outcome(&format!("bad{i}"), Verdict::Invalid)).collect(),
        };
        let total = valid + invalid;
        RunReport {
            summary: RunSummary {
                timestamp: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
                total_channels: total,
                completed: total,
                valid_count: valid,
                invalid_count: invalid,
                success_rate: if total == 0 { 0.0 } else { valid as f64 / total as f64 * 100.0 },
                cancelled: false,
            },
            results,
        }
    }

    #[test]
    fn test_exports_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_all(&report(2, 1), dir.path()).unwrap();

        assert_eq!(paths.all().len(), 4);
        assert_eq!(
            paths.report_json.file_name().unwrap(),
            "report_20240309_140507.json"
        );

        let valid_csv = std::fs::read_to_string(paths.valid_csv.unwrap()).unwrap();
        let mut lines = valid_csv.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next(), Some("name,url,group"));
        assert_eq!(lines.next(), Some("ok0,http://example.com/ok0,News"));

        let invalid_csv = std::fs::read_to_string(paths.invalid_csv.unwrap()).unwrap();
        assert!(invalid_csv.contains("bad0,http://example.com/bad0,News,HTTP 404"));

        let playlist = std::fs::read_to_string(paths.valid_m3u.unwrap()).unwrap();
        assert!(playlist.starts_with("#EXTM3U\n"));
        assert!(playlist.contains("#EXTINF:-1 group-title=\"News\",ok1\nhttp://example.com/ok1\n"));
    }

    #[test]
    fn test_skips_empty_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_all(&report(0, 2), dir.path()).unwrap();

        assert!(paths.valid_csv.is_none());
        assert!(paths.valid_m3u.is_none());
        assert!(paths.invalid_csv.is_some());
        assert!(paths.report_json.exists());
    }

    #[test]
    fn test_nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_all(&report(0, 0), dir.path());
        assert!(matches!(result, Err(ExportError::NothingToExport)));
    }

    #[test]
    fn test_failed_export_can_be_retried_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();

        let report = report(1, 1);
        assert!(matches!(
            export_all(&report, &blocked.join("out")),
            Err(ExportError::Io { .. })
        ));

        let paths = export_all(&report, &dir.path().join("elsewhere")).unwrap();
        assert_eq!(paths.all().len(), 4);
        assert_eq!(report.results.len(), 2);
    }
}
