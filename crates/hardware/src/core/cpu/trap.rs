//! Halt Reasons.
//!
//! This module defines why the engine stopped and how each reason maps to a process exit code.
//! It provides:
//! 1. **Halt Reasons:** Normal return, halt instruction, cycle budget, external termination and
//!    fatal faults.
//! 2. **Exit Codes:** A distinct process status per reason class; the program's own status for
//!    normal completion.

use std::fmt;

use crate::common::Trap;
use crate::common::constants::{
    EXIT_CYCLE_LIMIT, EXIT_ILLEGAL_INSTRUCTION, EXIT_OUT_OF_BOUNDS, EXIT_TERMINATED,
};

/// The reason the engine left the running state. Exactly one is recorded per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// Control reached the sentinel return address; `status` is `R1`.
    Returned {
        /// Program result.
        status: u32,
    },

    /// A `WAIT` instruction was executed; `status` is `R1`.
    HaltInstruction {
        /// Address of the halt instruction.
        pc: u32,
        /// Program result.
        status: u32,
    },

    /// The next instruction would have exceeded the cycle budget.
    CycleLimit {
        /// Cycles elapsed (never more than the budget).
        cycles: u64,
    },

    /// External termination was requested.
    Terminated {
        /// Address of the next instruction that would have run.
        pc: u32,
    },

    /// A fatal fault.
    Fault(Trap),
}

impl HaltReason {
    /// Process exit code for this halt reason.
    ///
    /// Normal completion reports the program status reinterpreted as a signed 32-bit integer.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Returned { status } | Self::HaltInstruction { status, .. } => *status as i32,
            Self::Terminated { .. } => EXIT_TERMINATED,
            Self::CycleLimit { .. } => EXIT_CYCLE_LIMIT,
            Self::Fault(Trap::OutOfBounds { .. }) => EXIT_OUT_OF_BOUNDS,
            Self::Fault(Trap::IllegalInstruction { .. }) => EXIT_ILLEGAL_INSTRUCTION,
        }
    }

    /// Whether the program finished on its own (return or halt instruction).
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Returned { .. } | Self::HaltInstruction { .. })
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returned { status } => write!(f, "returned with status {}", *status as i32),
            Self::HaltInstruction { pc, status } => {
                write!(f, "halted at {pc:#010x} with status {}", *status as i32)
            }
            Self::CycleLimit { cycles } => write!(f, "cycle limit reached after {cycles} cycles"),
            Self::Terminated { pc } => write!(f, "terminated at {pc:#010x}"),
            Self::Fault(trap) => write!(f, "fault: {trap}"),
        }
    }
}
