//! ALU arithmetic operations.
//!
//! Implements wrapping addition and subtraction, signed and unsigned min/max, and the
//! multiply/divide family. Division never traps: the results for a zero divisor and for the
//! signed overflow case (`i32::MIN / -1`) are fixed values.

use crate::isa::instruction::AluOp;

/// Number of bits in a word (used for high-multiply shift).
const WORD_BITS: u32 = 32;

/// Executes an integer arithmetic operation.
///
/// # Arguments
///
/// * `op` - The ALU operation to perform (must be an arithmetic variant).
/// * `a`  - First operand.
/// * `b`  - Second operand.
///
/// # Returns
///
/// The 32-bit result. Returns `0` for non-arithmetic opcodes.
pub fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Min => (a as i32).min(b as i32) as u32,
        AluOp::Max => (a as i32).max(b as i32) as u32,
        AluOp::Minu => a.min(b),
        AluOp::Maxu => a.max(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulhi => ((a as i32 as i64 * b as i32 as i64) >> WORD_BITS) as u32,
        AluOp::Mulhiu => ((a as u64 * b as u64) >> WORD_BITS) as u32,
        AluOp::Div => {
            if b == 0 {
                u32::MAX
            } else {
                // wrapping_div maps i32::MIN / -1 to i32::MIN.
                (a as i32).wrapping_div(b as i32) as u32
            }
        }
        AluOp::Divu => a.checked_div(b).unwrap_or(u32::MAX),
        AluOp::Rem => {
            if b == 0 {
                a
            } else {
                (a as i32).wrapping_rem(b as i32) as u32
            }
        }
        AluOp::Remu => a.checked_rem(b).unwrap_or(a),
        _ => 0,
    }
}
