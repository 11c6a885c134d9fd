//! Execution Controller.
//!
//! Runs the CPU engine on a dedicated, named OS thread. The controller owns:
//! 1. **Finished flag:** Written once by the task (release) when the engine halts or the task
//!    unwinds, polled without blocking by the host (acquire).
//! 2. **Termination flag:** Set by the host or any holder of a [`TerminationFlag`] clone,
//!    observed by the engine before each instruction.
//! 3. **Join:** Blocks until the task ends and turns a task panic into a value.
//!
//! Nothing unwinds into the host thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::common::constants::EXIT_FAILURE;
use crate::common::error::SimError;
use crate::core::cpu::{Cpu, HaltReason, TerminationFlag};

/// Name of the CPU task thread.
pub const CPU_THREAD_NAME: &str = "mr32-cpu";

/// Result of a finished CPU task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The engine halted; the CPU is returned for statistics, registers and dumps.
    Halted {
        /// Why the engine stopped.
        reason: HaltReason,
        /// Final CPU state.
        cpu: Box<Cpu>,
    },
    /// The task panicked.
    Panicked(String),
}

impl TaskOutcome {
    /// Process exit code of the run.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Halted { reason, .. } => reason.exit_code(),
            Self::Panicked(_) => EXIT_FAILURE,
        }
    }

    /// Halt reason, if the task did not panic.
    pub const fn reason(&self) -> Option<HaltReason> {
        match self {
            Self::Halted { reason, .. } => Some(*reason),
            Self::Panicked(_) => None,
        }
    }
}

/// Sets the finished flag when dropped, including during unwinding.
struct FinishGuard(Arc<AtomicBool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Handle to a CPU task running on its own thread.
#[derive(Debug)]
pub struct ExecutionController {
    handle: Option<JoinHandle<(HaltReason, Box<Cpu>)>>,
    finished: Arc<AtomicBool>,
    termination: TerminationFlag,
}

impl ExecutionController {
    /// Starts `cpu` immediately on a new thread.
    ///
    /// # Arguments
    ///
    /// * `cpu` - Engine in its initial state.
    /// * `max_cycles` - Cycle budget; `None` for unlimited.
    ///
    /// # Returns
    ///
    /// The controller, or the host error if the thread could not be created.
    pub fn spawn(mut cpu: Cpu, max_cycles: Option<u64>) -> Result<Self, SimError> {
        let finished = Arc::new(AtomicBool::new(false));
        let termination = TerminationFlag::new();
        cpu.set_termination_flag(termination.clone());

        let guard = FinishGuard(Arc::clone(&finished));
        let entry = cpu.pc;
        let handle = thread::Builder::new()
            .name(CPU_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                info!(entry = format_args!("{entry:#010x}"), "cpu task started");
                let reason = cpu.run(max_cycles);
                (reason, Box::new(cpu))
            })?;

        Ok(Self {
            handle: Some(handle),
            finished,
            termination,
        })
    }

    /// Whether the task has ended. Never blocks.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Asks the engine to stop before its next instruction. Idempotent.
    pub fn request_termination(&self) {
        self.termination.request();
    }

    /// Cloneable handle that can request termination from any thread.
    pub fn termination_handle(&self) -> TerminationFlag {
        self.termination.clone()
    }

    /// Blocks until the task ends.
    pub fn join(mut self) -> TaskOutcome {
        let Some(handle) = self.handle.take() else {
            return TaskOutcome::Panicked("cpu task already joined".to_string());
        };
        match handle.join() {
            Ok((reason, cpu)) => TaskOutcome::Halted { reason, cpu },
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!(message = %msg, "cpu task panicked");
                TaskOutcome::Panicked(msg)
            }
        }
    }
}

impl Drop for ExecutionController {
    /// Stops and joins a task that was never joined explicitly.
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.termination.request();
            let _ = handle.join();
        }
    }
}

/// Extracts the text of a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
