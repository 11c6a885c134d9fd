//! Unified Register File.
//!
//! This module provides the `RegisterFile` struct, which acts as a unified interface for
//! accessing both the scalar registers and the vector register bank. It provides:
//! 1. **Unified Storage:** Combined storage for all architectural registers.
//! 2. **Reset State:** The sentinel link register and full vector length installed at reset.
//! 3. **Observability:** Debugging utilities for dumping register state after a run.

use crate::common::constants::{END_OF_PROGRAM_LR, NUM_VECTOR_ELEMENTS};
use crate::core::arch::gpr::Gpr;
use crate::core::arch::vreg::{Lanes, VectorRegs};
use crate::isa::abi;

/// Unified register file containing the scalar and vector registers.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    gpr: Gpr,
    vregs: VectorRegs,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file in its reset state.
    ///
    /// Every register is zero except `LR`, which holds [`END_OF_PROGRAM_LR`], and `VL`, which
    /// selects all [`NUM_VECTOR_ELEMENTS`] lanes.
    pub fn new() -> Self {
        let mut gpr = Gpr::new();
        gpr.write(abi::REG_LR, END_OF_PROGRAM_LR);
        gpr.write(abi::REG_VL, NUM_VECTOR_ELEMENTS as u32);
        Self {
            gpr,
            vregs: VectorRegs::new(),
        }
    }

    /// Reads a scalar register (`Z` and the `PC` slot read as 0).
    pub fn read(&self, idx: usize) -> u32 {
        self.gpr.read(idx)
    }

    /// Writes a scalar register (writes to `Z` and `PC` are ignored).
    pub fn write(&mut self, idx: usize, val: u32) {
        self.gpr.write(idx, val);
    }

    /// Returns all lanes of vector register `idx`.
    pub fn read_v(&self, idx: usize) -> Lanes {
        self.vregs.read(idx)
    }

    /// Reads one lane of a vector register; lanes past the end read as 0.
    pub fn read_lane(&self, idx: usize, lane: usize) -> u32 {
        self.vregs.lane(idx, lane)
    }

    /// Replaces all lanes of vector register `idx`.
    pub fn write_v(&mut self, idx: usize, lanes: Lanes) {
        self.vregs.write(idx, lanes);
    }

    /// Writes one lane of a vector register.
    pub fn write_lane(&mut self, idx: usize, lane: usize, val: u32) {
        self.vregs.set_lane(idx, lane, val);
    }

    /// Number of active vector lanes: `min(VL, NUM_VECTOR_ELEMENTS)`.
    pub fn active_lanes(&self) -> usize {
        (self.gpr.read(abi::REG_VL) as usize).min(NUM_VECTOR_ELEMENTS)
    }

    /// Dumps the contents of all scalar registers to stdout.
    pub fn dump(&self) {
        self.gpr.dump();
    }
}
