// src/checker/retry.rs
// =============================================================================
// Turns probe attempts into the final outcome for one endpoint.
//
// With retry enabled an endpoint gets two attempts, otherwise one. Attempts
// run one after another; the first reachable attempt wins immediately and a
// total failure reports the reason from the LAST attempt.
// =============================================================================

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::probe::{probe_url, ProbeVerdict, Transport};
use crate::config::CheckConfig;
use crate::endpoint::Endpoint;

/// Reason used when no attempt produced a verdict
const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Final classification of one endpoint in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub verdict: Verdict,
    /// Status of the deciding attempt, if the server answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Why the endpoint is invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time of the deciding attempt in milliseconds
    #[serde(rename = "response_time_ms", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl ProbeOutcome {
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }

    /// Invalid outcome for an endpoint whose check blew up before any
    /// verdict existed
    pub fn fault(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            verdict: Verdict::Invalid,
            http_status: None,
            error: Some(reason.into()),
            latency_ms: None,
        }
    }

    fn from_verdict(endpoint: Endpoint, verdict: &ProbeVerdict, latency: Duration) -> Self {
        let classification = if verdict.is_reachable() {
            Verdict::Valid
        } else {
            Verdict::Invalid
        };

        Self {
            endpoint,
            verdict: classification,
            http_status: verdict.http_status(),
            error: verdict.error_reason(),
            latency_ms: Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

/// Probes one endpoint, retrying once if the config allows it.
pub async fn probe_with_retry(
    transport: &dyn Transport,
    endpoint: &Endpoint,
    config: &CheckConfig,
) -> ProbeOutcome {
    let max_attempts = config.max_attempts();
    let mut last_failure: Option<(ProbeVerdict, Duration)> = None;

    for attempt in 1..=max_attempts {
        let started = Instant::now();
        let verdict = probe_url(transport, &endpoint.url, config.timeout, config.method).await;
        let latency = started.elapsed();

        if verdict.is_reachable() {
            return ProbeOutcome::from_verdict(endpoint.clone(), &verdict, latency);
        }

        debug!(
            url = %endpoint.url,
            attempt,
            max_attempts,
            reason = verdict.error_reason().as_deref().unwrap_or(UNKNOWN_ERROR),
            "attempt failed"
        );
        last_failure = Some((verdict, latency));
    }

    match last_failure {
        Some((verdict, latency)) => ProbeOutcome::from_verdict(endpoint.clone(), &verdict, latency),
        None => ProbeOutcome::fault(endpoint.clone(), UNKNOWN_ERROR),
    }
}
