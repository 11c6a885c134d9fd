//! # Decoder Tests
//!
//! Format selection, operand extraction and rejection of reserved encodings.

use mr32sim_core::isa::abi::{REG_LR, REG_SP};
use mr32sim_core::isa::decode::decode;
use mr32sim_core::isa::instruction::{
    AluOp, BranchCond, Instruction, InstructionBits, InstructionClass, LoadWidth, Offset, Operand,
    StoreWidth, SystemOp, VectorAddressing, VectorOperand,
};
use mr32sim_core::isa::opcodes as op;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::asm::*;

#[test]
fn field_extraction() {
    let w = a(op::SUB, 3, 4, 5, VM_VV, 2);
    assert_eq!(w.major(), 0);
    assert_eq!(w.rd(), 3);
    assert_eq!(w.ra(), 4);
    assert_eq!(w.rb(), 5);
    assert_eq!(w.vm(), VM_VV);
    assert_eq!(w.t(), 2);
    assert_eq!(w.func(), op::SUB);

    let w = c(op::LDW, 1, 2, true, -1);
    assert_eq!(w.major(), op::LDW);
    assert!(w.v());
    assert_eq!(w.imm15(), -1);

    let w = d(op::D_LONG, op::LDI, 7, -1);
    assert_eq!(w.group(), op::D_LONG);
    assert_eq!(w.op3(), op::LDI);
    assert_eq!(w.imm21(), -1);
    assert_eq!(w.imm21_raw(), 0x1F_FFFF);
}

#[test]
fn return_instruction() {
    assert_eq!(ret(), 0xE3C0_0000);
    assert_eq!(
        decode(ret()),
        Some(Instruction::Jump {
            link: false,
            base: REG_LR as u8,
            offset: 0
        })
    );
}

#[test]
fn format_a_scalar_alu() {
    assert_eq!(
        decode(add(1, 2, 3)),
        Some(Instruction::Alu {
            op: AluOp::Add,
            rd: 1,
            ra: 2,
            b: Operand::Reg(3)
        })
    );
}

#[test]
fn format_c_immediate_alu() {
    assert_eq!(
        decode(addi(1, 2, -7)),
        Some(Instruction::Alu {
            op: AluOp::Add,
            rd: 1,
            ra: 2,
            b: Operand::Imm(-7i32 as u32)
        })
    );
}

#[rstest]
#[case(VM_VS, VectorOperand::Scalar(Operand::Reg(3)))]
#[case(VM_VV, VectorOperand::Vector(3))]
#[case(VM_FOLD, VectorOperand::Fold(3))]
fn format_a_vector_modes(#[case] vm: u32, #[case] b: VectorOperand) {
    assert_eq!(
        decode(a(op::MUL, 1, 2, 3, vm, 0)),
        Some(Instruction::VectorAlu {
            op: AluOp::Mul,
            vd: 1,
            va: 2,
            b
        })
    );
}

#[test]
fn format_c_vector_immediate() {
    assert_eq!(
        decode(valui(op::XOR, 4, 5, 0x3FFF)),
        Some(Instruction::VectorAlu {
            op: AluOp::Xor,
            vd: 4,
            va: 5,
            b: VectorOperand::Scalar(Operand::Imm(0x3FFF))
        })
    );
}

#[rstest]
#[case(op::LDB, LoadWidth::Byte)]
#[case(op::LDUB, LoadWidth::ByteUnsigned)]
#[case(op::LDH, LoadWidth::Half)]
#[case(op::LDUH, LoadWidth::HalfUnsigned)]
#[case(op::LDW, LoadWidth::Word)]
fn scalar_loads(#[case] code: u32, #[case] width: LoadWidth) {
    assert_eq!(
        decode(mem(code, 1, REG_SP, 8)),
        Some(Instruction::Load {
            width,
            rd: 1,
            ra: REG_SP as u8,
            offset: Offset::Imm(8)
        })
    );
    assert_eq!(
        decode(mem_indexed(code, 1, 2, 3, 2)),
        Some(Instruction::Load {
            width,
            rd: 1,
            ra: 2,
            offset: Offset::Indexed { rb: 3, shift: 2 }
        })
    );
}

#[rstest]
#[case(op::STB, StoreWidth::Byte)]
#[case(op::STH, StoreWidth::Half)]
#[case(op::STW, StoreWidth::Word)]
fn scalar_stores(#[case] code: u32, #[case] width: StoreWidth) {
    assert_eq!(
        decode(mem(code, 6, 7, -4)),
        Some(Instruction::Store {
            width,
            rs: 6,
            ra: 7,
            offset: Offset::Imm(-4)
        })
    );
}

#[test]
fn vector_memory_addressing() {
    assert_eq!(
        decode(vmem(op::LDW, 1, 2, 4)),
        Some(Instruction::VectorLoad {
            width: LoadWidth::Word,
            vd: 1,
            ra: 2,
            addressing: VectorAddressing::Stride(Offset::Imm(4))
        })
    );
    assert_eq!(
        decode(vmem_stride_reg(op::STH, 1, 2, 3, 1)),
        Some(Instruction::VectorStore {
            width: StoreWidth::Half,
            vs: 1,
            ra: 2,
            addressing: VectorAddressing::Stride(Offset::Indexed { rb: 3, shift: 1 })
        })
    );
    assert_eq!(
        decode(vmem_gather(op::LDEA, 1, 2, 9, 3)),
        Some(Instruction::VectorLoadEffectiveAddress {
            vd: 1,
            ra: 2,
            addressing: VectorAddressing::Gather { vb: 9, shift: 3 }
        })
    );
}

#[rstest]
#[case(op::BZ, BranchCond::Zero)]
#[case(op::BNZ, BranchCond::NotZero)]
#[case(op::BS, BranchCond::Set)]
#[case(op::BNS, BranchCond::NotSet)]
#[case(op::BLT, BranchCond::Negative)]
#[case(op::BGE, BranchCond::NonNegative)]
#[case(op::BLE, BranchCond::NonPositive)]
#[case(op::BGT, BranchCond::Positive)]
fn branches_scale_offset_to_bytes(#[case] code: u32, #[case] cond: BranchCond) {
    assert_eq!(
        decode(branch(code, 9, -3)),
        Some(Instruction::Branch {
            cond,
            rs: 9,
            offset: -12
        })
    );
}

#[test]
fn long_immediates() {
    assert_eq!(
        decode(ldi(1, -1)),
        Some(Instruction::LoadImmediate { rd: 1, value: u32::MAX })
    );
    assert_eq!(
        decode(ldhi(1, 0xDEAD_BEEF)),
        Some(Instruction::LoadImmediate {
            rd: 1,
            value: 0xDEAD_B800
        })
    );
    assert_eq!(
        decode(ldhio(1, 0)),
        Some(Instruction::LoadImmediate { rd: 1, value: 0x7FF })
    );
    assert_eq!(
        decode(addpc(2, -1)),
        Some(Instruction::AddPc {
            rd: 2,
            offset: -4i32 as u32
        })
    );
    assert_eq!(
        decode(d(op::D_LONG, op::ADDPCHI, 2, 1)),
        Some(Instruction::AddPc { rd: 2, offset: 0x800 })
    );
}

#[rstest]
#[case(op::SYS_NOP, SystemOp::Nop)]
#[case(op::SYS_SYNC, SystemOp::Sync)]
#[case(op::SYS_WAIT, SystemOp::Wait)]
fn system_group(#[case] sub: u32, #[case] sys: SystemOp) {
    assert_eq!(decode(system(sub)), Some(Instruction::System(sys)));
}

#[rstest]
#[case::all_zero(0x0000_0000)]
#[case::unused_func(a(0x1C, 1, 2, 3, VM_SCALAR, 0))]
#[case::alu_with_type(a(op::ADD, 1, 2, 3, VM_SCALAR, 3))]
#[case::unused_major_after_stores(c(0x2F, 1, 2, false, 0))]
#[case::unused_major(c(0x1F, 1, 2, false, 0))]
#[case::gap_between_loads_and_stores(c(0x26, 1, 2, false, 0))]
#[case::memory_fold_mode(a(op::LDW, 1, 2, 3, VM_FOLD, 0))]
#[case::unary_reserved_sub(a(op::UNARY_GROUP, 1, 2, 9, VM_SCALAR, 0))]
#[case::unary_fold(a(op::UNARY_GROUP, 1, 2, 0, VM_FOLD, 0))]
#[case::system_reserved_sub(system(3))]
#[case::system_vector(a(op::SYSTEM_GROUP, 0, 0, 0, VM_VS, 0))]
#[case::long_op7(d(op::D_LONG, 7, 1, 0))]
fn illegal_encodings(#[case] word: u32) {
    assert_eq!(decode(word), None);
}

#[test]
fn instruction_classes_and_costs() {
    let cases = [
        (add(1, 2, 3), InstructionClass::Alu, 1),
        (alu(op::DIV, 1, 2, 3), InstructionClass::MulDiv, 3),
        (alu(op::FMUL, 1, 2, 3), InstructionClass::Fpu, 2),
        (ldw(1, 2, 0), InstructionClass::Load, 2),
        (stw(1, 2, 0), InstructionClass::Store, 1),
        (branch(op::BZ, 1, 0), InstructionClass::Branch, 1),
        (ret(), InstructionClass::Jump, 2),
        (ldi(1, 0), InstructionClass::Alu, 1),
        (wait(), InstructionClass::System, 1),
    ];
    for (word, class, cycles) in cases {
        let inst = decode(word).unwrap();
        assert_eq!(inst.class(), class, "{inst:?}");
        assert_eq!(inst.cycles(16), cycles, "{inst:?}");
        assert!(!inst.is_vector());
    }
}

#[test]
fn vector_cost_scales_with_lanes() {
    let inst = decode(valu_vv(op::ADD, 1, 2, 3)).unwrap();
    assert!(inst.is_vector());
    assert_eq!(inst.cycles(16), 16);
    assert_eq!(inst.cycles(3), 3);
    assert_eq!(inst.cycles(0), 1);
}

proptest! {
    #[test]
    fn decode_never_panics(word: u32) {
        let _ = decode(word);
    }

    #[test]
    fn format_d_branches_always_decode(op3 in 0u32..8, rs in 0usize..32, imm in -(1i32 << 20)..(1i32 << 20)) {
        let inst = decode(branch(op3, rs, imm));
        prop_assert!(
            matches!(inst, Some(Instruction::Branch { offset, .. }) if offset == imm * 4),
            "{:?}",
            inst
        );
    }
}
