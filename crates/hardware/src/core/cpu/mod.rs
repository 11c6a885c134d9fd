//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which serves as the container for the
//! entire processor state. It coordinates the following:
//! 1. **State Management:** Maintains registers, the program counter and the halt reason.
//! 2. **Memory Integration:** Holds a shared handle to system RAM.
//! 3. **Observability:** Owns the execution statistics and the instruction tracer.
//! 4. **Cancellation:** Polls an externally settable termination flag once per instruction.

/// Fetch-decode-execute loop.
pub mod execution;

/// Memory access handling and fault conversion.
pub mod memory;

/// Halt reasons and exit codes.
pub mod trap;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use self::trap::HaltReason;
use crate::common::RegisterFile;
use crate::common::error::{ConfigError, SimError};
use crate::soc::memory::Memory;
use crate::stats::SimStats;
use crate::trace::Tracer;

/// Cloneable flag that asks a running engine to stop.
///
/// The engine observes the flag before each instruction, so termination latency is at most
/// one instruction.
#[derive(Clone, Debug, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests termination. Idempotent.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether termination has been requested.
    #[inline(always)]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Main CPU structure containing all processor state.
#[derive(Debug)]
pub struct Cpu {
    /// Scalar and vector registers.
    pub regs: RegisterFile,
    /// Program Counter.
    pub pc: u32,
    /// Execution statistics.
    pub stats: SimStats,
    memory: Memory,
    tracer: Tracer,
    termination: TerminationFlag,
    halt: Option<HaltReason>,
}

impl Cpu {
    /// Creates a CPU in its reset state, about to execute at `entry`.
    ///
    /// # Arguments
    ///
    /// * `memory` - Shared handle to system RAM.
    /// * `entry` - Address of the first instruction.
    pub fn new(memory: Memory, entry: u32) -> Self {
        Self {
            regs: RegisterFile::new(),
            pc: entry,
            stats: SimStats::default(),
            memory,
            tracer: Tracer::default(),
            termination: TerminationFlag::new(),
            halt: None,
        }
    }

    /// Installs an instruction tracer.
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Replaces the termination flag polled by the engine.
    pub fn set_termination_flag(&mut self, flag: TerminationFlag) {
        self.termination = flag;
    }

    /// Returns a handle to the termination flag polled by the engine.
    pub fn termination_flag(&self) -> TerminationFlag {
        self.termination.clone()
    }

    /// Shared handle to system RAM.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Execution statistics collected so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Why the engine halted, or `None` while it is still running.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt
    }

    /// Whether the engine has halted.
    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Writes `[begin, end)` of RAM to `sink`.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    pub fn dump_ram<W: Write>(&self, begin: u32, end: u32, sink: &mut W) -> Result<u64, SimError> {
        if begin > end {
            return Err(ConfigError::DumpRange { begin, end }.into());
        }
        self.memory
            .read_into(u64::from(begin), u64::from(end - begin), sink)
    }

    /// Writes `[begin, end)` of RAM to a new file at `path`.
    pub fn dump_ram_to_file(&self, begin: u32, end: u32, path: &Path) -> Result<u64, SimError> {
        let mut out = BufWriter::new(File::create(path)?);
        let written = self.dump_ram(begin, end, &mut out)?;
        out.flush()?;
        Ok(written)
    }

    /// Dumps the PC and scalar registers to stdout.
    pub fn dump_state(&self) {
        println!("PC = {:#010x}", self.pc);
        self.regs.dump();
    }
}
