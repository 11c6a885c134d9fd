//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the 32-bit ALU used by both the scalar and the vector execution
//! paths. A vector instruction calls it once per active lane.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Min/Max, Mul, Mulhi, Mulhiu, Div, Divu, Rem, Remu
//! - [`logic`]:      And, Or, Xor, Bic, Sel, set-if comparisons and bit counting
//! - [`shifts`]:     Asr, Lsl, Lsr
//!
//! Floating-point operations are forwarded to [`crate::core::units::fpu::Fpu`].

/// Integer arithmetic operations (add, subtract, min/max, multiply, divide).
pub mod arithmetic;

/// Bitwise logical, comparison and bit manipulation operations.
pub mod logic;

/// Shift operations (asr, lsl, lsr).
pub mod shifts;

use crate::core::units::fpu::Fpu;
use crate::isa::instruction::{AluOp, InstructionClass};

/// Arithmetic Logic Unit for 32-bit operations.
pub struct Alu;

impl Alu {
    /// Executes an ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation to perform.
    /// * `a`  - First operand.
    /// * `b`  - Second operand (shift amount for shifts, ignored by unary operations).
    /// * `d`  - Previous value of the destination; only `Sel` reads it.
    ///
    /// # Returns
    ///
    /// The 32-bit result. Comparisons return all-ones for true and zero for false.
    ///
    /// # Examples
    ///
    /// ```
    /// use mr32sim_core::core::units::alu::Alu;
    /// use mr32sim_core::isa::instruction::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8, 0), 50);
    /// assert_eq!(Alu::execute(AluOp::Add, 0xFFFF_FFFF, 1, 0), 0);
    /// assert_eq!(Alu::execute(AluOp::Slt, -5_i32 as u32, 10, 0), 0xFFFF_FFFF);
    /// assert_eq!(Alu::execute(AluOp::Divu, 100, 0, 0), 0xFFFF_FFFF);
    /// ```
    pub fn execute(op: AluOp, a: u32, b: u32, d: u32) -> u32 {
        if op.class() == InstructionClass::Fpu {
            return Fpu::execute(op, a, b);
        }
        match op {
            AluOp::Add
            | AluOp::Sub
            | AluOp::Min
            | AluOp::Max
            | AluOp::Minu
            | AluOp::Maxu
            | AluOp::Mul
            | AluOp::Mulhi
            | AluOp::Mulhiu
            | AluOp::Div
            | AluOp::Divu
            | AluOp::Rem
            | AluOp::Remu => arithmetic::execute(op, a, b),

            AluOp::Asr | AluOp::Lsl | AluOp::Lsr => shifts::execute(op, a, b),

            _ => logic::execute(op, a, b, d),
        }
    }
}
