//! Vector Register File.
//!
//! 32 vector registers of [`NUM_VECTOR_ELEMENTS`] 32-bit lanes. Register `VZ` (index 0) reads
//! as all-zero lanes and ignores writes, mirroring the scalar `Z` register.

use crate::common::constants::{NUM_VECTOR_ELEMENTS, NUM_VECTOR_REGS};

/// The lanes of one vector register.
pub type Lanes = [u32; NUM_VECTOR_ELEMENTS];

/// Vector register file.
#[derive(Clone, Debug)]
pub struct VectorRegs {
    regs: [Lanes; NUM_VECTOR_REGS],
}

impl Default for VectorRegs {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorRegs {
    /// Creates a vector register file with every lane zeroed.
    pub const fn new() -> Self {
        Self {
            regs: [[0; NUM_VECTOR_ELEMENTS]; NUM_VECTOR_REGS],
        }
    }

    /// Returns a copy of all lanes of register `idx`.
    pub fn read(&self, idx: usize) -> Lanes {
        if idx == 0 {
            [0; NUM_VECTOR_ELEMENTS]
        } else {
            self.regs[idx]
        }
    }

    /// Reads a single lane. Lanes past the register length read as zero.
    pub fn lane(&self, idx: usize, lane: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.regs[idx].get(lane).copied().unwrap_or(0)
        }
    }

    /// Replaces all lanes of register `idx`. Writes to `VZ` are ignored.
    pub fn write(&mut self, idx: usize, lanes: Lanes) {
        if idx != 0 {
            self.regs[idx] = lanes;
        }
    }

    /// Writes a single lane. Out-of-range lanes and `VZ` are ignored.
    pub fn set_lane(&mut self, idx: usize, lane: usize, val: u32) {
        if idx == 0 {
            return;
        }
        if let Some(slot) = self.regs[idx].get_mut(lane) {
            *slot = val;
        }
    }
}
