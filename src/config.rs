// src/config.rs
// =============================================================================
// Probing parameters for one run.
//
// The CLI fills this in from flags (clap already enforces the ranges there),
// but anything that builds a CheckConfig by hand goes through validate() so
// the engine never sees a zero concurrency or a 0-second timeout.
// =============================================================================

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

use crate::error::ConfigError;

pub const MIN_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const MIN_CONCURRENCY: usize = 1;
pub const MAX_CONCURRENCY: usize = 50;
pub const DEFAULT_CONCURRENCY: usize = 20;

/// How a single URL is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProbeMethod {
    /// HEAD request, redirects followed
    #[default]
    Head,
    /// GET request, only the first chunk of the body is read
    Get,
    /// HEAD with half the timeout, GET if HEAD fails at the transport level
    Hybrid,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeMethod::Head => "HEAD",
            ProbeMethod::Get => "GET",
            ProbeMethod::Hybrid => "Hybrid",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Timeout for one network attempt
    pub timeout: Duration,
    /// Maximum number of endpoints probed at the same time
    pub concurrency: usize,
    pub method: ProbeMethod,
    /// Give each endpoint a second attempt when the first one fails
    pub retry_enabled: bool,
    /// Show valid channels in the log too, not just the failures.
    /// Only the console reporter reads this.
    pub detailed_logging: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            method: ProbeMethod::Head,
            retry_enabled: true,
            detailed_logging: false,
        }
    }
}

impl CheckConfig {
    /// Checks that timeout and concurrency are inside their allowed ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.timeout.as_secs();
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
            return Err(ConfigError::Timeout {
                value: secs,
                min: MIN_TIMEOUT_SECS,
                max: MAX_TIMEOUT_SECS,
            });
        }

        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::Concurrency {
                value: self.concurrency,
                min: MIN_CONCURRENCY,
                max: MAX_CONCURRENCY,
            });
        }

        Ok(())
    }

    /// Number of attempts each endpoint gets
    pub fn max_attempts(&self) -> usize {
        if self.retry_enabled {
            2
        } else {
            1
        }
    }
}
