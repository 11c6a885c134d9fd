//! Application Binary Interface (ABI) register name constants.
//!
//! Defines the register aliases used by the calling convention and the simulator's
//! program-exit protocol.

/// Register 0 (`Z`, always zero).
pub const REG_Z: usize = 0;
/// Register 1 (first argument and return value; the reported exit status).
pub const REG_R1: usize = 1;
/// Register 26 (thread pointer).
pub const REG_TP: usize = 26;
/// Register 27 (frame pointer).
pub const REG_FP: usize = 27;
/// Register 28 (stack pointer).
pub const REG_SP: usize = 28;
/// Register 29 (vector length).
pub const REG_VL: usize = 29;
/// Register 30 (link register, holds the return address).
pub const REG_LR: usize = 30;
/// Register 31 (reads as the address of the executing instruction).
pub const REG_PC: usize = 31;

/// Register holding the program's exit status when it returns.
pub const REG_RESULT: usize = REG_R1;

const NAMES: [&str; 32] = [
    "z", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13", "r14",
    "r15", "r16", "r17", "r18", "r19", "r20", "r21", "r22", "r23", "r24", "r25", "tp", "fp", "sp",
    "vl", "lr", "pc",
];

const VNAMES: [&str; 32] = [
    "vz", "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10", "v11", "v12", "v13", "v14",
    "v15", "v16", "v17", "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26", "v27",
    "v28", "v29", "v30", "v31",
];

/// Returns the assembler name of scalar register `idx`.
#[inline]
pub fn name(idx: usize) -> &'static str {
    NAMES.get(idx).copied().unwrap_or("r??")
}

/// Returns the assembler name of vector register `idx`.
#[inline]
pub fn vname(idx: usize) -> &'static str {
    VNAMES.get(idx).copied().unwrap_or("v??")
}
