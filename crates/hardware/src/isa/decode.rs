//! Instruction Decoder.
//!
//! This module turns raw 32-bit instruction words into the closed [`Instruction`] enum. It
//! performs the following:
//! 1. **Format Selection:** Format D when the top bits are `11x`, format A when the major
//!    opcode is zero, format C otherwise.
//! 2. **Operand Extraction:** Register indices, scaled index registers and sign-extended
//!    immediates.
//! 3. **Validation:** Reserved sub-operations, scalar-only groups and non-zero `t` fields on
//!    ALU operations all decode to `None`, which the engine reports as an illegal instruction.

use crate::isa::instruction::{
    AluOp, BranchCond, Instruction, InstructionBits, LoadWidth, Offset, Operand, StoreWidth,
    SystemOp, VectorAddressing, VectorOperand,
};
use crate::isa::opcodes as op;

/// Shift applied to the 21-bit immediate by the `*HI` forms.
const HI_IMM_SHIFT: u32 = 11;

/// Low bits filled in by `LDHIO`.
const HI_IMM_LOW_ONES: u32 = (1 << HI_IMM_SHIFT) - 1;

/// Vector mode field values (format A).
const VM_SCALAR: u32 = 0b00;
const VM_VECTOR_SCALAR: u32 = 0b01;
const VM_VECTOR_VECTOR: u32 = 0b10;
const VM_FOLD: u32 = 0b11;

/// Decodes a raw instruction word.
///
/// Returns `None` for any word that is not a valid instruction, including the all-zero word.
pub fn decode(word: u32) -> Option<Instruction> {
    match word.group() {
        op::D_BRANCH => Some(decode_branch(word)),
        op::D_LONG => decode_long(word),
        _ if word.major() == 0 => decode_format_a(word),
        _ => decode_format_c(word),
    }
}

fn decode_branch(word: u32) -> Instruction {
    let cond = match word.op3() {
        op::BZ => BranchCond::Zero,
        op::BNZ => BranchCond::NotZero,
        op::BS => BranchCond::Set,
        op::BNS => BranchCond::NotSet,
        op::BLT => BranchCond::Negative,
        op::BGE => BranchCond::NonNegative,
        op::BLE => BranchCond::NonPositive,
        _ => BranchCond::Positive,
    };
    Instruction::Branch {
        cond,
        rs: word.rd() as u8,
        offset: word.imm21().wrapping_mul(4),
    }
}

fn decode_long(word: u32) -> Option<Instruction> {
    let rd = word.rd() as u8;
    let hi = word.imm21_raw() << HI_IMM_SHIFT;
    let inst = match word.op3() {
        op::J | op::JL => Instruction::Jump {
            link: word.op3() == op::JL,
            base: rd,
            offset: word.imm21().wrapping_mul(4),
        },
        op::LDI => Instruction::LoadImmediate {
            rd,
            value: word.imm21() as u32,
        },
        op::LDHI => Instruction::LoadImmediate { rd, value: hi },
        op::LDHIO => Instruction::LoadImmediate {
            rd,
            value: hi | HI_IMM_LOW_ONES,
        },
        op::ADDPC => Instruction::AddPc {
            rd,
            offset: word.imm21().wrapping_mul(4) as u32,
        },
        op::ADDPCHI => Instruction::AddPc { rd, offset: hi },
        _ => return None,
    };
    Some(inst)
}

fn decode_format_a(word: u32) -> Option<Instruction> {
    let func = word.func();
    let rd = word.rd() as u8;
    let ra = word.ra() as u8;
    let rb = word.rb() as u8;
    let vm = word.vm();
    let t = word.t();

    if func == op::SYSTEM_GROUP {
        if vm != VM_SCALAR || t != 0 {
            return None;
        }
        let sys = match word.rb() as u32 {
            op::SYS_NOP => SystemOp::Nop,
            op::SYS_SYNC => SystemOp::Sync,
            op::SYS_WAIT => SystemOp::Wait,
            _ => return None,
        };
        return Some(Instruction::System(sys));
    }

    if func == op::UNARY_GROUP {
        if t != 0 {
            return None;
        }
        let unary = unary_op(word.rb() as u32)?;
        let b = Operand::Imm(0);
        return match vm {
            VM_SCALAR => Some(Instruction::Alu { op: unary, rd, ra, b }),
            VM_VECTOR_SCALAR | VM_VECTOR_VECTOR => Some(Instruction::VectorAlu {
                op: unary,
                vd: rd,
                va: ra,
                b: VectorOperand::Scalar(b),
            }),
            _ => None,
        };
    }

    if let Some(mem) = MemOp::from_code(func) {
        let indexed = Offset::Indexed { rb, shift: t as u8 };
        return match vm {
            VM_SCALAR => Some(mem.scalar(rd, ra, indexed)),
            VM_VECTOR_SCALAR => Some(mem.vector(rd, ra, VectorAddressing::Stride(indexed))),
            VM_VECTOR_VECTOR => Some(mem.vector(
                rd,
                ra,
                VectorAddressing::Gather {
                    vb: rb,
                    shift: t as u8,
                },
            )),
            _ => None,
        };
    }

    let alu = int_op(func).or_else(|| fpu_op(func))?;
    if t != 0 {
        return None;
    }
    let inst = match vm {
        VM_SCALAR => Instruction::Alu {
            op: alu,
            rd,
            ra,
            b: Operand::Reg(rb),
        },
        VM_VECTOR_SCALAR => Instruction::VectorAlu {
            op: alu,
            vd: rd,
            va: ra,
            b: VectorOperand::Scalar(Operand::Reg(rb)),
        },
        VM_VECTOR_VECTOR => Instruction::VectorAlu {
            op: alu,
            vd: rd,
            va: ra,
            b: VectorOperand::Vector(rb),
        },
        VM_FOLD => Instruction::VectorAlu {
            op: alu,
            vd: rd,
            va: ra,
            b: VectorOperand::Fold(rb),
        },
        _ => return None,
    };
    Some(inst)
}

fn decode_format_c(word: u32) -> Option<Instruction> {
    let code = word.major();
    let rd = word.rd() as u8;
    let ra = word.ra() as u8;
    let imm = word.imm15();

    if let Some(mem) = MemOp::from_code(code) {
        let offset = Offset::Imm(imm);
        return Some(if word.v() {
            mem.vector(rd, ra, VectorAddressing::Stride(offset))
        } else {
            mem.scalar(rd, ra, offset)
        });
    }

    let alu = int_op(code)?;
    let b = Operand::Imm(imm as u32);
    Some(if word.v() {
        Instruction::VectorAlu {
            op: alu,
            vd: rd,
            va: ra,
            b: VectorOperand::Scalar(b),
        }
    } else {
        Instruction::Alu {
            op: alu,
            rd,
            ra,
            b,
        }
    })
}

/// Memory operation selected by a shared function / opcode.
#[derive(Clone, Copy)]
enum MemOp {
    Load(LoadWidth),
    Lea,
    Store(StoreWidth),
}

impl MemOp {
    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            op::LDB => Self::Load(LoadWidth::Byte),
            op::LDUB => Self::Load(LoadWidth::ByteUnsigned),
            op::LDH => Self::Load(LoadWidth::Half),
            op::LDUH => Self::Load(LoadWidth::HalfUnsigned),
            op::LDW => Self::Load(LoadWidth::Word),
            op::LDEA => Self::Lea,
            op::STB => Self::Store(StoreWidth::Byte),
            op::STH => Self::Store(StoreWidth::Half),
            op::STW => Self::Store(StoreWidth::Word),
            _ => return None,
        })
    }

    fn scalar(self, rd: u8, ra: u8, offset: Offset) -> Instruction {
        match self {
            Self::Load(width) => Instruction::Load {
                width,
                rd,
                ra,
                offset,
            },
            Self::Lea => Instruction::LoadEffectiveAddress { rd, ra, offset },
            Self::Store(width) => Instruction::Store {
                width,
                rs: rd,
                ra,
                offset,
            },
        }
    }

    fn vector(self, rd: u8, ra: u8, addressing: VectorAddressing) -> Instruction {
        match self {
            Self::Load(width) => Instruction::VectorLoad {
                width,
                vd: rd,
                ra,
                addressing,
            },
            Self::Lea => Instruction::VectorLoadEffectiveAddress {
                vd: rd,
                ra,
                addressing,
            },
            Self::Store(width) => Instruction::VectorStore {
                width,
                vs: rd,
                ra,
                addressing,
            },
        }
    }
}

fn int_op(code: u32) -> Option<AluOp> {
    Some(match code {
        op::AND => AluOp::And,
        op::OR => AluOp::Or,
        op::XOR => AluOp::Xor,
        op::BIC => AluOp::Bic,
        op::ADD => AluOp::Add,
        op::SUB => AluOp::Sub,
        op::MIN => AluOp::Min,
        op::MAX => AluOp::Max,
        op::MINU => AluOp::Minu,
        op::MAXU => AluOp::Maxu,
        op::SEQ => AluOp::Seq,
        op::SNE => AluOp::Sne,
        op::SLT => AluOp::Slt,
        op::SLTU => AluOp::Sltu,
        op::SLE => AluOp::Sle,
        op::SLEU => AluOp::Sleu,
        op::ASR => AluOp::Asr,
        op::LSL => AluOp::Lsl,
        op::LSR => AluOp::Lsr,
        op::SEL => AluOp::Sel,
        op::MUL => AluOp::Mul,
        op::MULHI => AluOp::Mulhi,
        op::MULHIU => AluOp::Mulhiu,
        op::DIV => AluOp::Div,
        op::DIVU => AluOp::Divu,
        op::REM => AluOp::Rem,
        op::REMU => AluOp::Remu,
        _ => return None,
    })
}

fn fpu_op(code: u32) -> Option<AluOp> {
    Some(match code {
        op::FADD => AluOp::FAdd,
        op::FSUB => AluOp::FSub,
        op::FMUL => AluOp::FMul,
        op::FDIV => AluOp::FDiv,
        op::FMIN => AluOp::FMin,
        op::FMAX => AluOp::FMax,
        op::FSEQ => AluOp::FSeq,
        op::FSNE => AluOp::FSne,
        op::FSLT => AluOp::FSlt,
        op::FSLE => AluOp::FSle,
        op::ITOF => AluOp::Itof,
        op::UTOF => AluOp::Utof,
        op::FTOI => AluOp::Ftoi,
        op::FTOU => AluOp::Ftou,
        _ => return None,
    })
}

fn unary_op(sub: u32) -> Option<AluOp> {
    Some(match sub {
        op::UNARY_REV => AluOp::Rev,
        op::UNARY_CLZ => AluOp::Clz,
        op::UNARY_POPCNT => AluOp::Popcnt,
        op::UNARY_REVB => AluOp::Revb,
        op::UNARY_FSQRT => AluOp::FSqrt,
        _ => return None,
    })
}
