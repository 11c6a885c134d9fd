//! Execution units.
//!
//! This module contains the functional units the engine dispatches ALU-class work to: the
//! integer ALU and the single-precision FPU. Both are pure functions of their operands and are
//! shared by the scalar and lane-wise vector paths.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Floating-Point Unit for IEEE 754 binary32 operations.
pub mod fpu;
