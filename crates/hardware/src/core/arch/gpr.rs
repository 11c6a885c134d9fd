//! Scalar General-Purpose Register File.
//!
//! This module implements the scalar register file. It performs the following:
//! 1. **Storage:** Maintains 32 registers of 32 bits (`Z`, `R1`-`R25`, `TP`, `FP`, `SP`, `VL`, `LR`, `PC`).
//! 2. **Invariant Enforcement:** `Z` reads as zero; writes to `Z` and `PC` are dropped.
//! 3. **Debugging:** Provides utilities for dumping the complete register state.

use crate::common::constants::NUM_SCALAR_REGS;
use crate::isa::abi;

/// General-Purpose Register file.
///
/// Slot 31 is never stored: the `PC` alias is resolved by the engine, which knows the address
/// of the executing instruction.
#[derive(Clone, Debug)]
pub struct Gpr {
    regs: [u32; NUM_SCALAR_REGS],
}

impl Default for Gpr {
    fn default() -> Self {
        Self::new()
    }
}

impl Gpr {
    /// Creates a new register file with all registers initialized to zero.
    pub const fn new() -> Self {
        Self {
            regs: [0; NUM_SCALAR_REGS],
        }
    }

    /// Reads a register. `Z` always returns 0; the `PC` slot returns 0 as well.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    pub fn read(&self, idx: usize) -> u32 {
        if idx == abi::REG_Z || idx == abi::REG_PC {
            0
        } else {
            self.regs[idx]
        }
    }

    /// Writes a register. Writes to `Z` and `PC` are ignored.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != abi::REG_Z && idx != abi::REG_PC {
            self.regs[idx] = val;
        }
    }

    /// Dumps the contents of all scalar registers to stdout, four per line.
    pub fn dump(&self) {
        for i in (0..NUM_SCALAR_REGS).step_by(4) {
            println!(
                "{:>3}={:#010x} {:>3}={:#010x} {:>3}={:#010x} {:>3}={:#010x}",
                abi::name(i),
                self.read(i),
                abi::name(i + 1),
                self.read(i + 1),
                abi::name(i + 2),
                self.read(i + 2),
                abi::name(i + 3),
                self.read(i + 3),
            );
        }
    }
}
