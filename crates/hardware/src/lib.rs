//! Instruction-set simulator library for a 32-bit vector RISC architecture.
//!
//! This crate implements a sequential, instruction-accurate simulator with the following:
//! 1. **Core:** Fetch-decode-execute engine over 32 scalar and 32 vector registers.
//! 2. **Memory:** Flat, bounds-checked RAM shared across threads through relaxed atomics.
//! 3. **ISA:** Decoding and disassembly of the A, C and D instruction formats.
//! 4. **SoC:** MMIO constants window and framebuffer rasterizer.
//! 5. **Simulation:** Loader, threaded execution controller, presentation seam, configuration,
//!    statistics and instruction tracing.

/// Common types and constants (registers, traps, errors, access types).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (registers, execution units, execution loop).
pub mod core;
/// Instruction set (opcodes, decode, disassembly, ABI names).
pub mod isa;
/// Loader, execution controller, presentation and orchestration.
pub mod sim;
/// System-on-chip (RAM, MMIO window, framebuffer).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Instruction trace records and sinks.
pub mod trace;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, memory handle and stats.
pub use crate::core::Cpu;
/// Halt reason of a run.
pub use crate::core::cpu::HaltReason;
/// Shared system RAM.
pub use crate::soc::Memory;
/// Top-level simulator.
pub use crate::sim::Simulator;
