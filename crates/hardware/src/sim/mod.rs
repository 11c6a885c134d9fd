//! Simulation orchestration.
//!
//! Provides program loading, the threaded execution controller, the presentation loop and the
//! top-level `Simulator` that ties them together for one run.

/// Execution controller running the CPU on its own thread.
pub mod controller;

/// Program image loading.
pub mod loader;

/// Presentation seam and loop.
pub mod presentation;

/// Top-level run orchestration.
pub mod simulator;

pub use simulator::{RunReport, Simulator};
