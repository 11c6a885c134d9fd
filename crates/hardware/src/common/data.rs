//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Fault Reporting:** Telling an out-of-bounds fetch apart from a data access.
//! 2. **Tracing:** Tagging the memory access of a retired instruction.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch access.
    Fetch,

    /// Data read access (loads, framebuffer sampling, dumps).
    Read,

    /// Data write access (stores, program loading, MMIO constants).
    Write,
}

impl AccessType {
    /// Returns a short lowercase name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}
