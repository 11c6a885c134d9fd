//! Architectural state.
//!
//! This module contains the architecturally visible register files:
//! 1. **GPRs:** The 32 scalar registers, with the hardwired `Z` and `PC` slots.
//! 2. **Vector registers:** The 32 vector registers of 16 lanes each.

/// General-Purpose (scalar) register file implementation.
pub mod gpr;

/// Vector register file implementation.
pub mod vreg;
