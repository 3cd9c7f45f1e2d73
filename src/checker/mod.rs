// src/checker/mod.rs
// =============================================================================
// This module contains everything that touches a single URL.
//
// Submodules:
// - http: The real network transport (reqwest) and its error categories
// - probe: HEAD / GET / Hybrid strategies on top of any transport
// - retry: Runs a strategy up to twice and turns the result into an outcome
//
// The engine only ever sees `probe_with_retry` and the `Transport` trait, so
// tests can swap the network for a scripted fake.
// =============================================================================

mod http;
mod probe;
mod retry;

#[cfg(test)]
pub(crate) mod fakes;

pub use http::HttpTransport;
pub use probe::{probe_url, ProbeVerdict, Transport};
pub use retry::{probe_with_retry, ProbeOutcome, Verdict};
