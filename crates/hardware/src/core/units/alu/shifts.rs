//! ALU shift operations.
//!
//! Shift amounts are masked to 5 bits (0-31).

use crate::isa::instruction::AluOp;

/// Bit mask for the shift amount (5 bits: 0-31).
const SHAMT_MASK: u32 = 0x1f;

/// Executes a shift operation.
///
/// # Arguments
///
/// * `op` - The ALU operation to perform (must be a shift variant).
/// * `a`  - The value to be shifted.
/// * `b`  - The shift amount (lower five bits used).
///
/// # Returns
///
/// The shifted value. Returns `0` for non-shift opcodes.
pub fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    let shamt = b & SHAMT_MASK;
    match op {
        AluOp::Lsl => a << shamt,
        AluOp::Lsr => a >> shamt,
        AluOp::Asr => ((a as i32) >> shamt) as u32,
        _ => 0,
    }
}
