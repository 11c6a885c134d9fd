//! Floating-Point Unit (FPU).
//!
//! This module implements the single-precision floating-point unit. Operands and results are
//! raw IEEE 754 binary32 bit patterns carried in ordinary scalar registers or vector lanes; there
//! is no separate floating-point register file and no exception flag state.
//!
//! The integer conversions take a scale exponent in their second operand:
//! - `ITOF`/`UTOF`: `a as f32 * 2^-b`
//! - `FTOI`/`FTOU`: `trunc(a * 2^b)`, saturating, NaN converts to 0

use crate::core::units::alu::logic::mask;
use crate::isa::instruction::AluOp;

/// Floating-Point Unit for binary32 operations.
pub struct Fpu;

impl Fpu {
    /// Executes a floating-point operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation to perform (must be an FPU-class variant).
    /// * `a`  - First operand, as raw bits (an integer for `ITOF`/`UTOF`).
    /// * `b`  - Second operand, as raw bits (a signed scale exponent for conversions).
    ///
    /// # Returns
    ///
    /// The raw 32-bit result. Comparisons return all-ones for true.
    pub fn execute(op: AluOp, a: u32, b: u32) -> u32 {
        let fa = f32::from_bits(a);
        let fb = f32::from_bits(b);
        match op {
            AluOp::FAdd => (fa + fb).to_bits(),
            AluOp::FSub => (fa - fb).to_bits(),
            AluOp::FMul => (fa * fb).to_bits(),
            AluOp::FDiv => (fa / fb).to_bits(),
            AluOp::FMin => fa.min(fb).to_bits(),
            AluOp::FMax => fa.max(fb).to_bits(),
            AluOp::FSeq => mask(fa == fb),
            AluOp::FSne => mask(fa != fb),
            AluOp::FSlt => mask(fa < fb),
            AluOp::FSle => mask(fa <= fb),
            AluOp::Itof => scale(a as i32 as f64, (b as i32).wrapping_neg()).to_bits(),
            AluOp::Utof => scale(a as f64, (b as i32).wrapping_neg()).to_bits(),
            AluOp::Ftoi => {
                let x = f64::from(fa) * exp2(b as i32);
                // `as` truncates toward zero, saturates and maps NaN to 0.
                (x as i32) as u32
            }
            AluOp::Ftou => {
                let x = f64::from(fa) * exp2(b as i32);
                x as u32
            }
            AluOp::FSqrt => fa.sqrt().to_bits(),
            _ => 0,
        }
    }
}

/// `2^e` in double precision; exponents beyond the representable range saturate to 0 or inf.
#[inline]
fn exp2(e: i32) -> f64 {
    2f64.powi(e.clamp(-1100, 1100))
}

#[inline]
fn scale(x: f64, e: i32) -> f32 {
    (x * exp2(e)) as f32
}
