//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the register naming convention, the opcode map, the field extraction helpers and
//! the decoder for the 32-bit vector instruction set.
//!
//! # Formats
//!
//! * A: register–register, with a vector mode and an index scale field.
//! * C: register–immediate, with a vector flag and a 15-bit immediate.
//! * D: branches, jumps and 21-bit immediates.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Instruction decoding into the closed [`instruction::Instruction`] enum.
pub mod decode;

/// Instruction disassembler for tracing and diagnostics.
pub mod disasm;

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Opcode and function-code constants.
pub mod opcodes;
