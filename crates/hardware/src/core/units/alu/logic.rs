//! ALU logical, comparison and bit manipulation operations.
//!
//! Comparisons produce a full-width mask (`0xFFFF_FFFF` for true, `0` for false) so that the
//! result can be fed straight into `Sel` or a `BS`/`BNS` branch.

use crate::isa::instruction::AluOp;

/// Converts a predicate into a full-width mask.
#[inline(always)]
pub const fn mask(cond: bool) -> u32 {
    if cond { u32::MAX } else { 0 }
}

/// Executes a logical, comparison or bit manipulation operation.
///
/// `d` is the previous destination value, read only by `Sel`.
pub fn execute(op: AluOp, a: u32, b: u32, d: u32) -> u32 {
    match op {
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Bic => a & !b,
        AluOp::Seq => mask(a == b),
        AluOp::Sne => mask(a != b),
        AluOp::Slt => mask((a as i32) < (b as i32)),
        AluOp::Sltu => mask(a < b),
        AluOp::Sle => mask((a as i32) <= (b as i32)),
        AluOp::Sleu => mask(a <= b),
        AluOp::Sel => (a & d) | (b & !d),
        AluOp::Rev => a.reverse_bits(),
        AluOp::Clz => a.leading_zeros(),
        AluOp::Popcnt => a.count_ones(),
        AluOp::Revb => a.swap_bytes(),
        _ => 0,
    }
}
