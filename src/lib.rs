// src/lib.rs
// =============================================================================
// stream-guardian as a library: the probing engine and its collaborators.
//
// main.rs is a thin console front end over these modules. Anything else that
// wants to drive a run (a GUI, a service) uses the same API:
//
//   let engine = Engine::with_http()?;
//   let mut run = engine.start(endpoints, &config)?;
//   while let Some(event) = run.next_event().await { ... }
//   let report = run.wait().await?;
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod console;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod export;
pub mod playlist;

pub use config::{CheckConfig, ProbeMethod};
pub use endpoint::Endpoint;
pub use engine::{Engine, RunEvent, RunHandle, RunReport};
