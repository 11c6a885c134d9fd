//! Core processor implementation.
//!
//! This module contains the CPU execution engine, the architectural register banks and the
//! execution units the engine dispatches to.

/// Architectural register banks (scalar and vector).
pub mod arch;

/// CPU execution engine.
pub mod cpu;

/// Execution units (ALU, FPU).
pub mod units;

pub use self::cpu::Cpu;
