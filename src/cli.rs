// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share the same probing options:
// - check: read channels from a playlist / CSV / URL list file
// - url: check URLs given directly on the command line
//
// Ranges for --timeout and --concurrency are enforced by clap itself, so a
// bad value is rejected with a usage message before anything runs.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    CheckConfig, ProbeMethod, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, MAX_CONCURRENCY,
    MAX_TIMEOUT_SECS, MIN_CONCURRENCY, MIN_TIMEOUT_SECS,
};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "stream-guardian",
    version,
    about = "Checks streaming playlists for channels that no longer answer",
    long_about = "stream-guardian probes every channel of an M3U playlist, CSV file or URL list \
                  over HTTP and sorts them into valid and invalid ones. \
                  Results can be exported as CSV, a cleaned-up M3U playlist and a JSON report."
)]
pub struct Cli {
    /// Show debug logs (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every channel in a playlist file
    ///
    /// Example: stream-guardian check channels.m3u --method hybrid --export-dir out/
    Check {
        /// M3U playlist, `name,url` CSV, or one URL per line
        file: PathBuf,

        #[command(flatten)]
        options: CheckOptions,
    },

    /// Check URLs given on the command line
    ///
    /// Example: stream-guardian url http://example.com/live.m3u8
    Url {
        /// One or more stream URLs
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        options: CheckOptions,
    },
}

/// Probing and output options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CheckOptions {
    /// Timeout per request, in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS)
    )]
    pub timeout: u64,

    /// How many channels to check at the same time
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_CONCURRENCY as u64,
        value_parser = clap::value_parser!(u64).range((MIN_CONCURRENCY as u64)..=(MAX_CONCURRENCY as u64))
    )]
    pub concurrency: u64,

    /// Request method used to check a channel
    #[arg(long, value_enum, default_value_t = ProbeMethod::Head)]
    pub method: ProbeMethod,

    /// Give up on a channel after the first failed attempt
    #[arg(long)]
    pub no_retry: bool,

    /// Also list channels that work, not just the broken ones
    #[arg(long)]
    pub detailed: bool,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write CSV, M3U and JSON result files into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl CheckOptions {
    pub fn to_config(&self) -> CheckConfig {
        CheckConfig {
            timeout: Duration::from_secs(self.timeout),
            // clap already limited this to 1..=50
            concurrency: self.concurrency as usize,
            method: self.method,
            retry_enabled: !self.no_retry,
            detailed_logging: self.detailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["stream-guardian", "check", "list.m3u"]).unwrap();
        let Commands::Check { file, options } = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(file, PathBuf::from("list.m3u"));
        assert_eq!(options.to_config(), CheckConfig::default());
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "stream-guardian",
            "-v",
            "url",
            "http://a",
            "http://b",
            "--timeout",
            "30",
            "-j",
            "5",
            "--method",
            "hybrid",
            "--no-retry",
            "--detailed",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Url { urls, options } = cli.command else {
            panic!("expected url command");
        };
        assert_eq!(urls.len(), 2);

        let config = options.to_config();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.method, ProbeMethod::Hybrid);
        assert!(!config.retry_enabled);
        assert!(config.detailed_logging);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(Cli::try_parse_from(["stream-guardian", "check", "f", "--timeout", "4"]).is_err());
        assert!(Cli::try_parse_from(["stream-guardian", "check", "f", "-j", "51"]).is_err());
        assert!(Cli::try_parse_from(["stream-guardian", "check", "f", "-j", "0"]).is_err());
    }

    #[test]
    fn test_url_requires_at_least_one() {
        assert!(Cli::try_parse_from(["stream-guardian", "url"]).is_err());
    }
}
