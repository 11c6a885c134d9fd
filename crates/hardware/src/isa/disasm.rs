//! Instruction Disassembler.
//!
//! Converts a 32-bit instruction word into a human-readable mnemonic string for the text trace,
//! logging and test diagnostics. Words that do not decode render as `.word 0x........`.
//!
//! # Usage
//!
//! ```
//! use mr32sim_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0xE3C0_0000), "j lr, #0");
//! ```

use crate::isa::abi::{name, vname};
use crate::isa::decode::decode;
use crate::isa::instruction::{
    Instruction, InstructionBits, Offset, Operand, SystemOp, VectorAddressing, VectorOperand,
};
use crate::isa::opcodes as op;

/// Disassembles a raw instruction word.
pub fn disassemble(word: u32) -> String {
    match decode(word) {
        Some(inst) => format_instruction(&inst, word),
        None => format!(".word {word:#010x}"),
    }
}

/// Formats an already-decoded instruction. `word` is only consulted to recover the mnemonic of
/// encodings that decode to the same variant (for example `ldi` and `ldhi`).
pub fn format_instruction(inst: &Instruction, word: u32) -> String {
    match *inst {
        Instruction::Alu { op, rd, ra, b } => {
            if op.is_unary() {
                format!("{} {}, {}", op.mnemonic(), reg(rd), reg(ra))
            } else {
                format!("{} {}, {}, {}", op.mnemonic(), reg(rd), reg(ra), operand(b))
            }
        }
        Instruction::Load {
            width,
            rd,
            ra,
            offset,
        } => format!("{} {}, {}", width.mnemonic(), reg(rd), address(ra, offset)),
        Instruction::LoadEffectiveAddress { rd, ra, offset } => {
            format!("ldea {}, {}", reg(rd), address(ra, offset))
        }
        Instruction::Store {
            width,
            rs,
            ra,
            offset,
        } => format!("{} {}, {}", width.mnemonic(), reg(rs), address(ra, offset)),
        Instruction::Branch { cond, rs, offset } => {
            format!("{} {}, #{offset}", cond.mnemonic(), reg(rs))
        }
        Instruction::Jump { link, base, offset } => {
            let mnemonic = if link { "jl" } else { "j" };
            format!("{mnemonic} {}, #{offset}", reg(base))
        }
        Instruction::LoadImmediate { rd, value } => {
            let mnemonic = match word.op3() {
                op::LDHI => "ldhi",
                op::LDHIO => "ldhio",
                _ => "ldi",
            };
            if mnemonic == "ldi" {
                format!("ldi {}, #{}", reg(rd), value as i32)
            } else {
                format!("{mnemonic} {}, #{value:#010x}", reg(rd))
            }
        }
        Instruction::AddPc { rd, offset } => {
            if word.op3() == op::ADDPCHI {
                format!("addpchi {}, #{offset:#010x}", reg(rd))
            } else {
                format!("addpc {}, #{}", reg(rd), offset as i32)
            }
        }
        Instruction::VectorAlu { op, vd, va, b } => {
            if op.is_unary() {
                return format!("{} {}, {}", op.mnemonic(), vreg(vd), vreg(va));
            }
            match b {
                VectorOperand::Scalar(s) => {
                    format!("{}.vs {}, {}, {}", op.mnemonic(), vreg(vd), vreg(va), operand(s))
                }
                VectorOperand::Vector(vb) => {
                    format!("{}.vv {}, {}, {}", op.mnemonic(), vreg(vd), vreg(va), vreg(vb))
                }
                VectorOperand::Fold(vb) => {
                    format!("{}.fold {}, {}, {}", op.mnemonic(), vreg(vd), vreg(va), vreg(vb))
                }
            }
        }
        Instruction::VectorLoad {
            width,
            vd,
            ra,
            addressing,
        } => format!(
            "{} {}, {}",
            width.mnemonic(),
            vreg(vd),
            vector_address(ra, addressing)
        ),
        Instruction::VectorLoadEffectiveAddress { vd, ra, addressing } => {
            format!("ldea {}, {}", vreg(vd), vector_address(ra, addressing))
        }
        Instruction::VectorStore {
            width,
            vs,
            ra,
            addressing,
        } => format!(
            "{} {}, {}",
            width.mnemonic(),
            vreg(vs),
            vector_address(ra, addressing)
        ),
        Instruction::System(sys) => match sys {
            SystemOp::Nop => "nop".to_string(),
            SystemOp::Sync => "sync".to_string(),
            SystemOp::Wait => "wait".to_string(),
        },
    }
}

#[inline]
fn reg(idx: u8) -> &'static str {
    name(idx as usize)
}

#[inline]
fn vreg(idx: u8) -> &'static str {
    vname(idx as usize)
}

fn operand(b: Operand) -> String {
    match b {
        Operand::Reg(r) => reg(r).to_string(),
        Operand::Imm(imm) => format!("#{}", imm as i32),
    }
}

fn scaled(index: &str, shift: u8) -> String {
    if shift == 0 {
        index.to_string()
    } else {
        format!("{index}*{}", 1u32 << shift)
    }
}

fn address(ra: u8, offset: Offset) -> String {
    match offset {
        Offset::Imm(imm) => format!("[{}, #{imm}]", reg(ra)),
        Offset::Indexed { rb, shift } => format!("[{}, {}]", reg(ra), scaled(reg(rb), shift)),
    }
}

fn vector_address(ra: u8, addressing: VectorAddressing) -> String {
    match addressing {
        VectorAddressing::Stride(offset) => address(ra, offset),
        VectorAddressing::Gather { vb, shift } => {
            format!("[{}, {}]", reg(ra), scaled(vreg(vb), shift))
        }
    }
}
