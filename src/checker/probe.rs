// src/checker/probe.rs
// =============================================================================
// Probe strategies: decide whether one URL is reachable.
//
// Three methods are supported:
// - HEAD: lightweight, but plenty of streaming origins reject it
// - GET: reads only the first chunk of the body
// - Hybrid: HEAD with half the timeout, then GET with the full timeout if
//   HEAD failed at the transport level (a non-200 answer does NOT fall back)
//
// A URL counts as reachable only when the final status is exactly 200.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ProbeMethod;
use crate::error::ProbeError;

/// The two network operations a probe strategy needs.
///
/// Both return the HTTP status code on any answer from the server; only
/// failures to get an answer are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// HEAD request, following redirects
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError>;

    /// GET request that reads at most the first chunk of the body
    async fn get_partial(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError>;
}

/// Result of one probe attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// Server answered 200
    Reachable,
    /// The attempt ran out of time
    Timeout,
    /// DNS, connect, TLS or similar failure
    TransportError(String),
    /// Server answered with something other than 200
    StatusError(u16),
}

impl ProbeVerdict {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeVerdict::Reachable)
    }

    /// HTTP status, if the server answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProbeVerdict::Reachable => Some(200),
            ProbeVerdict::StatusError(code) => Some(*code),
            ProbeVerdict::Timeout | ProbeVerdict::TransportError(_) => None,
        }
    }

    /// Human readable failure reason; `None` when reachable
    pub fn error_reason(&self) -> Option<String> {
        match self {
            ProbeVerdict::Reachable => None,
            ProbeVerdict::Timeout => Some("timeout".to_string()),
            ProbeVerdict::TransportError(message) => Some(message.clone()),
            ProbeVerdict::StatusError(code) => Some(format!("HTTP {code}")),
        }
    }

    fn from_response(result: Result<u16, ProbeError>) -> Self {
        match result {
            Ok(200) => ProbeVerdict::Reachable,
            Ok(code) => ProbeVerdict::StatusError(code),
            Err(ProbeError::Timeout) => ProbeVerdict::Timeout,
            Err(ProbeError::Transport(message)) => ProbeVerdict::TransportError(message),
        }
    }
}

/// Runs one probe against `url` with the given method.
pub async fn probe_url(
    transport: &dyn Transport,
    url: &str,
    timeout: Duration,
    method: ProbeMethod,
) -> ProbeVerdict {
    let result = match method {
        ProbeMethod::Head => transport.head(url, timeout).await,
        ProbeMethod::Get => transport.get_partial(url, timeout).await,
        ProbeMethod::Hybrid => match transport.head(url, timeout / 2).await {
            Ok(status) => Ok(status),
            Err(error) => {
                debug!(url, %error, "HEAD failed, falling back to GET");
                transport.get_partial(url, timeout).await
            }
        },
    };

    ProbeVerdict::from_response(result)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - The engine stores the transport as Arc<dyn Transport>
//    - async fn in a trait object needs its future boxed; the macro does it
//
// 2. Why &dyn Transport instead of a generic?
//    - One compiled copy of probe_url serves the real client and the test
//      fakes alike, and the scheduler never needs to know which one it has
//
// 3. Why is a 404 not a Hybrid fallback trigger?
//    - The server did answer. Only "no answer at all" is worth a second,
//      heavier request
// -----------------------------------------------------------------------------
