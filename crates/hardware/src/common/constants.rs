//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Architecture Constants:** Register counts, vector length, instruction size.
//! 2. **Calling Convention Constants:** The sentinel return address and reset values.
//! 3. **Exit Codes:** Process exit codes for every abnormal halt class.

/// Number of scalar registers (`Z`, `R1`-`R25`, `TP`, `FP`, `SP`, `VL`, `LR`, `PC`).
pub const NUM_SCALAR_REGS: usize = 32;

/// Number of vector registers (`VZ`, `V1`-`V31`).
pub const NUM_VECTOR_REGS: usize = 32;

/// Number of 32-bit lanes in each vector register.
pub const NUM_VECTOR_ELEMENTS: usize = 16;

/// Size of an instruction word in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Return address installed in `LR` at reset.
///
/// Jumping to this address from the top-level routine ends the program. It can never be the
/// start of a 4-byte fetch inside a memory of at most 4 GiB.
pub const END_OF_PROGRAM_LR: u32 = 0xFFFF_FFFF;

/// Largest supported RAM size (the full 32-bit address space).
pub const MAX_RAM_SIZE: u64 = 1 << 32;

/// Exit code used when the CPU task panicked or the run could not be set up.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a run halted by an external termination request.
pub const EXIT_TERMINATED: i32 = 2;

/// Exit code for a run that exhausted its cycle budget.
pub const EXIT_CYCLE_LIMIT: i32 = 3;

/// Exit code for a run halted by an out-of-bounds memory access.
pub const EXIT_OUT_OF_BOUNDS: i32 = 4;

/// Exit code for a run halted by an illegal instruction.
pub const EXIT_ILLEGAL_INSTRUCTION: i32 = 5;
