//! Memory Access Helpers.
//!
//! This module provides the interface between the CPU and the memory subsystem. It performs the
//! following:
//! 1. **Width Dispatch:** Maps decoded load/store widths onto sized memory accesses.
//! 2. **Fault Conversion:** Turns a memory range error into an out-of-bounds trap carrying the
//!    address of the faulting instruction.

use super::Cpu;
use crate::common::{MemoryError, Trap};
use crate::isa::instruction::{LoadWidth, StoreWidth};

/// Converts a memory error raised by the instruction at `pc` into a trap.
#[inline]
pub fn to_trap(err: &MemoryError, addr: u32, pc: u32) -> Trap {
    match err {
        MemoryError::OutOfBounds { addr, .. } => Trap::OutOfBounds { addr: *addr, pc },
        _ => Trap::OutOfBounds {
            addr: u64::from(addr),
            pc,
        },
    }
}

impl Cpu {
    /// Fetches the instruction word at `pc`.
    pub(crate) fn fetch(&self, pc: u32) -> Result<u32, Trap> {
        self.memory.fetch32(pc).map_err(|e| to_trap(&e, pc, pc))
    }

    /// Loads a value of `width` from `addr`, extended to 32 bits.
    pub(crate) fn load(&self, width: LoadWidth, addr: u32, pc: u32) -> Result<u32, Trap> {
        let mem = &self.memory;
        let res = match width {
            LoadWidth::Byte => mem.load8_signed(addr),
            LoadWidth::ByteUnsigned => mem.load8(addr).map(u32::from),
            LoadWidth::Half => mem.load16_signed(addr),
            LoadWidth::HalfUnsigned => mem.load16(addr).map(u32::from),
            LoadWidth::Word => mem.load32(addr),
        };
        res.map_err(|e| to_trap(&e, addr, pc))
    }

    /// Stores the low `width` bytes of `val` at `addr`.
    pub(crate) fn store(&self, width: StoreWidth, addr: u32, val: u32, pc: u32) -> Result<(), Trap> {
        let mem = &self.memory;
        let res = match width {
            StoreWidth::Byte => mem.store8(addr, val as u8),
            StoreWidth::Half => mem.store16(addr, val as u16),
            StoreWidth::Word => mem.store32(addr, val),
        };
        res.map_err(|e| to_trap(&e, addr, pc))
    }
}
