// src/error.rs
// =============================================================================
// Error types used across the crate.
//
// The engine, the list loader and the exporters each get their own enum so a
// caller can match on exactly the failures that layer can produce. main.rs
// wraps everything in anyhow at the very edge of the program.
//
// Rust concepts:
// - thiserror: Derives std::error::Error + Display from attributes
// - #[from]: Generates a From impl so `?` converts errors automatically
// =============================================================================

use std::path::PathBuf;

/// Failure of a single network attempt.
///
/// Non-200 statuses are not errors at this level: the transport returns the
/// status code and the probe strategy decides what it means.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The attempt hit its timeout
    #[error("timeout")]
    Timeout,

    /// DNS, connect, TLS, reset or any other transport-level failure
    #[error("{0}")]
    Transport(String),
}

/// Reasons a run refuses to start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("no endpoints to check")]
    NoEndpoints,

    #[error("a run is already in progress")]
    RunInProgress,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Probing parameters outside their allowed ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("timeout must be between {min} and {max} seconds, got {value}")]
    Timeout { value: u64, min: u64, max: u64 },

    #[error("concurrency must be between {min} and {max}, got {value}")]
    Concurrency { value: usize, min: usize, max: usize },
}

/// Errors while reading an endpoint list from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no endpoints found in {0}")]
    Empty(PathBuf),
}

/// Errors while writing results to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there are no results to export")]
    NothingToExport,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}
