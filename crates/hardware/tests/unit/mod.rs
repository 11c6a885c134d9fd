//! # Unit Components
//!
//! This module serves as the central hub for the per-subsystem tests: the processor core, the
//! ISA tables, the SoC memory and devices, and the simulation front half.



/// Unit tests for instruction decoding and disassembly.
pub mod isa;




/// Unit tests for trace records and sinks.
pub mod trace;
