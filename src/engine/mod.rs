// src/engine/mod.rs
// =============================================================================
// The probing engine: start a run, watch its events, cancel it.
//
// Submodules:
// - scheduler: bounded-concurrency dispatch with cooperative cancellation
// - aggregator: single consumer that counts, partitions and reports
// - events: the messages sent to the display side
//
// Lifecycle of the engine:
//
//   Idle --start--> Running --cancel--> Cancelling
//                      |                    |
//                      +------> Complete <--+
//
// A new run may start from Idle or Complete. Starting while Running or
// Cancelling is rejected.
// =============================================================================

mod aggregator;
mod events;
mod scheduler;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use aggregator::{Aggregator, ResultPartition, RunReport, RunState};
pub use events::{ProgressSnapshot, RunEvent, RunSummary};
pub use scheduler::Completion;

use crate::checker::{HttpTransport, Transport};
use crate::config::CheckConfig;
use crate::endpoint::Endpoint;
use crate::error::StartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Cancelling,
    Complete,
}

impl RunPhase {
    fn is_active(self) -> bool {
        matches!(self, RunPhase::Running | RunPhase::Cancelling)
    }
}

// Phase of the engine plus the number of the run it belongs to. Every start
// bumps the generation, so handles left over from an earlier run can tell
// that the phase is no longer theirs.
#[derive(Debug, Clone, Copy)]
struct PhaseSlot {
    phase: RunPhase,
    generation: u64,
}

type SharedPhase = Arc<Mutex<PhaseSlot>>;

// The lock only guards a Copy struct, so a poisoned lock still holds a usable
// value.
fn lock(slot: &SharedPhase) -> MutexGuard<'_, PhaseSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Moves `generation`'s run to Complete. A no-op once a newer run owns the
// slot.
fn complete(slot: &SharedPhase, generation: u64) {
    let mut slot = lock(slot);
    if slot.generation == generation {
        slot.phase = RunPhase::Complete;
    }
}

// Held by the run task. If the task panics or is aborted before finishing,
// dropping the guard frees the engine for the next run and stops the
// scheduler that would otherwise keep probing for nobody.
struct RunGuard {
    slot: SharedPhase,
    generation: u64,
    cancel: CancellationToken,
    finished: bool,
}

impl RunGuard {
    fn finish(&mut self) {
        self.finished = true;
        complete(&self.slot, self.generation);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!(generation = self.generation, "run task ended early");
            self.cancel.cancel();
            complete(&self.slot, self.generation);
        }
    }
}

/// Runs probes against endpoint lists, one run at a time.
pub struct Engine {
    transport: Arc<dyn Transport>,
    phase: SharedPhase,
}

impl Engine {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            phase: Arc::new(Mutex::new(PhaseSlot {
                phase: RunPhase::Idle,
                generation: 0,
            })),
        }
    }

    /// Engine that probes over real HTTP
    pub fn with_http() -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    pub fn phase(&self) -> RunPhase {
        lock(&self.phase).phase
    }

    /// Starts checking `endpoints` in the background.
    ///
    /// Must be called from inside a tokio runtime. Fails without touching
    /// any state when the list is empty, the config is out of range, or
    /// another run is still active.
    pub fn start(
        &self,
        endpoints: Vec<Endpoint>,
        config: &CheckConfig,
    ) -> Result<RunHandle, StartError> {
        if endpoints.is_empty() {
            return Err(StartError::NoEndpoints);
        }
        config.validate()?;

        let generation = {
            let mut slot = lock(&self.phase);
            if slot.phase.is_active() {
                return Err(StartError::RunInProgress);
            }
            slot.phase = RunPhase::Running;
            slot.generation += 1;
            slot.generation
        };

        let total = endpoints.len();
        info!(
            generation,
            total,
            concurrency = config.concurrency,
            method = %config.method,
            timeout_secs = config.timeout.as_secs(),
            retry = config.retry_enabled,
            "starting run"
        );

        let cancel = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(drive_run(
            Arc::clone(&self.transport),
            endpoints,
            config.clone(),
            cancel.clone(),
            events_tx.clone(),
            RunGuard {
                slot: Arc::clone(&self.phase),
                generation,
                cancel: cancel.clone(),
                finished: false,
            },
        ));

        Ok(RunHandle {
            canceller: RunCanceller {
                token: cancel,
                slot: Arc::clone(&self.phase),
                generation,
                events: events_tx,
            },
            events: events_rx,
            task,
        })
    }

    /// Requests cancellation of `handle`'s run
    pub fn cancel(&self, handle: &RunHandle) {
        handle.cancel();
    }
}

// One run: the scheduler feeds completions through a channel, this task is
// the only reader and owns the aggregator. The channel closing is the
// scheduler's completion signal.
async fn drive_run(
    transport: Arc<dyn Transport>,
    endpoints: Vec<Endpoint>,
    config: CheckConfig,
    cancel: CancellationToken,
    events: UnboundedSender<RunEvent>,
    mut guard: RunGuard,
) -> RunReport {
    let total = endpoints.len();
    let (completions_tx, mut completions_rx) = mpsc::channel(config.concurrency.max(1) * 2);

    let dispatcher = tokio::spawn(scheduler::run(
        transport,
        endpoints,
        config,
        cancel.clone(),
        completions_tx,
    ));

    let mut aggregator = Aggregator::new(total, events);
    while let Some(completion) = completions_rx.recv().await {
        match completion {
            Completion::Probed(outcome) => aggregator.record(outcome),
            Completion::Faulted { outcome, message } => aggregator.record_fault(outcome, message),
        }
    }

    if let Err(error) = dispatcher.await {
        warn!(%error, "scheduler task failed");
    }

    // Flip the phase before the completion event goes out, so a display that
    // reacts to it can start the next run straight away.
    guard.finish();
    aggregator.finish(cancel.is_cancelled())
}

/// Cloneable cancel button for a run, e.g. for a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct RunCanceller {
    token: CancellationToken,
    slot: SharedPhase,
    generation: u64,
    events: UnboundedSender<RunEvent>,
}

impl RunCanceller {
    /// Stops dispatching new probes. Probes already in flight finish and
    /// are still counted. Does nothing unless this run is the one Running;
    /// a canceller kept from an earlier run never touches a later one.
    pub fn cancel(&self) {
        {
            let mut slot = lock(&self.slot);
            if slot.generation != self.generation || slot.phase != RunPhase::Running {
                return;
            }
            slot.phase = RunPhase::Cancelling;
        }

        info!(generation = self.generation, "cancellation requested");
        self.token.cancel();
        let _ = self.events.send(RunEvent::Status("cancelling...".to_string()));
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A run in progress
#[derive(Debug)]
pub struct RunHandle {
    canceller: RunCanceller,
    events: UnboundedReceiver<RunEvent>,
    task: JoinHandle<RunReport>,
}

impl RunHandle {
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> RunCanceller {
        self.canceller.clone()
    }

    /// Waits for the next event
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Returns an already queued event without waiting
    pub fn try_next_event(&mut self) -> Option<RunEvent> {
        self.events.try_recv().ok()
    }

    /// Whether the run task has finished (events may still be queued)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the run to finish and returns its results
    pub async fn wait(self) -> Result<RunReport, JoinError> {
        self.task.await
    }
}
