// src/checker/fakes.rs
// =============================================================================
// Scripted transports for tests. None of these touch the network.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::probe::Transport;
use crate::error::ProbeError;

/// Always answers HEAD and GET with fixed results and records the timeouts
/// it was called with.
pub struct StaticTransport {
    head: Result<u16, ProbeError>,
    get: Result<u16, ProbeError>,
    head_timeouts: Mutex<Vec<Duration>>,
    get_timeouts: Mutex<Vec<Duration>>,
}

impl StaticTransport {
    pub fn new(head: Result<u16, ProbeError>, get: Result<u16, ProbeError>) -> Self {
        Self {
            head,
            get,
            head_timeouts: Mutex::new(Vec::new()),
            get_timeouts: Mutex::new(Vec::new()),
        }
    }

    pub fn head_calls(&self) -> usize {
        self.head_timeouts.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> usize {
        self.get_timeouts.lock().unwrap().len()
    }

    pub fn head_timeouts(&self) -> Vec<Duration> {
        self.head_timeouts.lock().unwrap().clone()
    }

    pub fn get_timeouts(&self) -> Vec<Duration> {
        self.get_timeouts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn head(&self, _url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        self.head_timeouts.lock().unwrap().push(timeout);
        self.head.clone()
    }

    async fn get_partial(&self, _url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        self.get_timeouts.lock().unwrap().push(timeout);
        self.get.clone()
    }
}

/// Fails the first `failures` calls with a transport error, then answers 200.
pub struct FlakyTransport {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyTransport {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<u16, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(ProbeError::Transport("connection reset".to_string()))
        } else {
            Ok(200)
        }
    }
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn head(&self, _url: &str, _timeout: Duration) -> Result<u16, ProbeError> {
        self.answer()
    }

    async fn get_partial(&self, _url: &str, _timeout: Duration) -> Result<u16, ProbeError> {
        self.answer()
    }
}

/// Sleeps on every call and tracks how many calls overlap.
///
/// URLs containing `/bad` answer 404, URLs containing `/panic` panic, the
/// rest answer 200.
pub struct CountingTransport {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, url: &str) -> Result<u16, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if url.contains("/panic") {
            panic!("probe exploded for {url}");
        }
        if url.contains("/bad") {
            Ok(404)
        } else {
            Ok(200)
        }
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn head(&self, url: &str, _timeout: Duration) -> Result<u16, ProbeError> {
        self.answer(url).await
    }

    async fn get_partial(&self, url: &str, _timeout: Duration) -> Result<u16, ProbeError> {
        self.answer(url).await
    }
}
