// src/engine/scheduler.rs
// =============================================================================
// Bounded-concurrency dispatch of probes.
//
// How it works:
// 1. Endpoints are turned into a stream, in input order
// 2. Each one becomes a retry-wrapped probe future
// 3. buffer_unordered(N) keeps N of those futures in flight and yields their
//    outcomes as they finish (not in input order)
// 4. Outcomes are pushed into a channel read by the aggregator
//
// Cancellation: before each endpoint is pulled from the input, the token is
// checked. Once it is cancelled nothing new starts, but the probes already in
// flight are left alone and their outcomes are still delivered. Dropping the
// channel sender at the end is the completion signal.
// =============================================================================

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, FutureExt};
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::checker::{probe_with_retry, ProbeOutcome, Transport};
use crate::config::CheckConfig;
use crate::endpoint::Endpoint;

/// What the scheduler hands to the aggregator for each finished endpoint
#[derive(Debug)]
pub enum Completion {
    /// The probe ran to a verdict (valid or invalid)
    Probed(ProbeOutcome),
    /// The probe crashed; the outcome is Invalid and carries the fault text
    Faulted {
        outcome: ProbeOutcome,
        message: String,
    },
}

/// Probes every endpoint with at most `config.concurrency` in flight.
///
/// Returns the number of endpoints that were dispatched.
pub async fn run(
    transport: Arc<dyn Transport>,
    endpoints: Vec<Endpoint>,
    config: CheckConfig,
    cancel: CancellationToken,
    completions: mpsc::Sender<Completion>,
) -> usize {
    let limit = config.concurrency.max(1);
    let total = endpoints.len();
    let mut dispatched = 0usize;

    let gate = cancel.clone();
    let config = Arc::new(config);

    let mut in_flight = stream::iter(endpoints)
        // Checked each time a slot frees up and the next endpoint is pulled
        .take_while(move |_| future::ready(!gate.is_cancelled()))
        .inspect(|_| dispatched += 1)
        .map(|endpoint| {
            let transport = Arc::clone(&transport);
            let config = Arc::clone(&config);
            async move { probe_guarded(transport.as_ref(), endpoint, &config).await }
        })
        .buffer_unordered(limit);

    while let Some(completion) = in_flight.next().await {
        if completions.send(completion).await.is_err() {
            warn!("result channel closed, stopping dispatch");
            break;
        }
    }
    drop(in_flight);

    if cancel.is_cancelled() {
        debug!(dispatched, total, "dispatch stopped by cancellation");
    } else {
        debug!(dispatched, total, "all endpoints dispatched");
    }

    dispatched
}

// Runs one probe and turns a panic inside it into an Invalid outcome, so a
// single broken endpoint can never take the rest of the run down with it.
async fn probe_guarded(
    transport: &dyn Transport,
    endpoint: Endpoint,
    config: &CheckConfig,
) -> Completion {
    let result = AssertUnwindSafe(probe_with_retry(transport, &endpoint, config))
        .catch_unwind()
        .await;

    match result {
        Ok(outcome) => Completion::Probed(outcome),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!(url = %endpoint.url, %reason, "probe crashed");
            let message = format!("error checking {}: {}", endpoint.name, reason);
            Completion::Faulted {
                outcome: ProbeOutcome::fault(endpoint, reason),
                message,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected internal error".to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does buffer_unordered do here?
//    - It polls up to N futures at once and yields each result as soon as it
//      is ready, so a slow channel never holds up a fast one
//    - A new endpoint is only pulled from the input when a slot is free
//
// 2. Why take_while for cancellation?
//    - take_while runs its check every time the next item is requested
//    - Returning false ends the input stream; buffer_unordered then just
//      drains what it already has in flight
//
// 3. What is catch_unwind?
//    - It turns a panic inside a future into an Err value
//    - AssertUnwindSafe is our promise that nothing shared is left half
//      updated if that happens (the probe only borrows read-only data)
// -----------------------------------------------------------------------------
