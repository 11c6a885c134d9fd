//! Instruction encoding and decoded instruction types.
//!
//! Provides bit extraction for the three instruction formats and the closed set of decoded
//! instruction variants the engine executes.
//!
//! ```text
//! A: | 000000 | rd:5 | ra:5 | rb:5 | vm:2 | t:2 | func:7 |
//! C: | op:6   | rd:5 | ra:5 | v:1  | imm15              |
//! D: | 11x op:3      | rd:5 | imm21                      |
//! ```

/// Bit mask for a 5-bit register field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for the format A function field.
pub const FUNC_MASK: u32 = 0x7F;
/// Number of bits in the format C immediate.
pub const IMM15_BITS: u32 = 15;
/// Number of bits in the format D immediate.
pub const IMM21_BITS: u32 = 21;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Major opcode (bits 26-31).
    fn major(&self) -> u32;
    /// Format D group selector (bits 29-31).
    fn group(&self) -> u32;
    /// Format D sub-operation (bits 26-28).
    fn op3(&self) -> u32;
    /// Destination register field (bits 21-25).
    fn rd(&self) -> usize;
    /// First source register field (bits 16-20).
    fn ra(&self) -> usize;
    /// Second source register field (bits 11-15, format A).
    fn rb(&self) -> usize;
    /// Vector mode (bits 9-10, format A).
    fn vm(&self) -> u32;
    /// Index scale / packed type field (bits 7-8, format A).
    fn t(&self) -> u32;
    /// Function code (bits 0-6, format A).
    fn func(&self) -> u32;
    /// Vector flag (bit 15, format C).
    fn v(&self) -> bool;
    /// Sign-extended 15-bit immediate (format C).
    fn imm15(&self) -> i32;
    /// Sign-extended 21-bit immediate (format D).
    fn imm21(&self) -> i32;
    /// Raw (zero-extended) 21-bit immediate (format D).
    fn imm21_raw(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn major(&self) -> u32 {
        self >> 26
    }

    #[inline(always)]
    fn group(&self) -> u32 {
        self >> 29
    }

    #[inline(always)]
    fn op3(&self) -> u32 {
        (self >> 26) & 0x7
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 21) & REG_MASK) as usize
    }

    #[inline(always)]
    fn ra(&self) -> usize {
        ((self >> 16) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rb(&self) -> usize {
        ((self >> 11) & REG_MASK) as usize
    }

    #[inline(always)]
    fn vm(&self) -> u32 {
        (self >> 9) & 0x3
    }

    #[inline(always)]
    fn t(&self) -> u32 {
        (self >> 7) & 0x3
    }

    #[inline(always)]
    fn func(&self) -> u32 {
        self & FUNC_MASK
    }

    #[inline(always)]
    fn v(&self) -> bool {
        (self >> 15) & 1 == 1
    }

    #[inline(always)]
    fn imm15(&self) -> i32 {
        sign_extend(self & ((1 << IMM15_BITS) - 1), IMM15_BITS)
    }

    #[inline(always)]
    fn imm21(&self) -> i32 {
        sign_extend(self.imm21_raw(), IMM21_BITS)
    }

    #[inline(always)]
    fn imm21_raw(&self) -> u32 {
        self & ((1 << IMM21_BITS) - 1)
    }
}

/// Sign extends the low `bits` bits of `val` to 32 bits.
#[inline(always)]
pub const fn sign_extend(val: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((val << shift) as i32) >> shift
}

/// Arithmetic, logic and floating-point operations shared by the scalar and vector paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// `a & b`
    And,
    /// `a | b`
    Or,
    /// `a ^ b`
    Xor,
    /// `a & !b`
    Bic,
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// Signed minimum.
    Min,
    /// Signed maximum.
    Max,
    /// Unsigned minimum.
    Minu,
    /// Unsigned maximum.
    Maxu,
    /// Set if equal.
    Seq,
    /// Set if not equal.
    Sne,
    /// Set if less than (signed).
    Slt,
    /// Set if less than (unsigned).
    Sltu,
    /// Set if less than or equal (signed).
    Sle,
    /// Set if less than or equal (unsigned).
    Sleu,
    /// Arithmetic shift right.
    Asr,
    /// Logical shift left.
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Bitwise select: `(a & d) | (b & !d)` with `d` the old destination.
    Sel,
    /// Multiply, low word.
    Mul,
    /// Multiply, high word, signed.
    Mulhi,
    /// Multiply, high word, unsigned.
    Mulhiu,
    /// Signed division.
    Div,
    /// Unsigned division.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
    /// Bit reverse (unary).
    Rev,
    /// Count leading zeros (unary).
    Clz,
    /// Population count (unary).
    Popcnt,
    /// Byte reverse (unary).
    Revb,
    /// Float add.
    FAdd,
    /// Float subtract.
    FSub,
    /// Float multiply.
    FMul,
    /// Float divide.
    FDiv,
    /// Float minimum.
    FMin,
    /// Float maximum.
    FMax,
    /// Float set if equal.
    FSeq,
    /// Float set if not equal.
    FSne,
    /// Float set if less than.
    FSlt,
    /// Float set if less than or equal.
    FSle,
    /// Signed int to float.
    Itof,
    /// Unsigned int to float.
    Utof,
    /// Float to signed int.
    Ftoi,
    /// Float to unsigned int.
    Ftou,
    /// Float square root (unary).
    FSqrt,
}

impl AluOp {
    /// Execution class of this operation.
    pub const fn class(self) -> InstructionClass {
        match self {
            Self::Mul | Self::Mulhi | Self::Mulhiu | Self::Div | Self::Divu | Self::Rem | Self::Remu => {
                InstructionClass::MulDiv
            }
            Self::FAdd
            | Self::FSub
            | Self::FMul
            | Self::FDiv
            | Self::FMin
            | Self::FMax
            | Self::FSeq
            | Self::FSne
            | Self::FSlt
            | Self::FSle
            | Self::Itof
            | Self::Utof
            | Self::Ftoi
            | Self::Ftou
            | Self::FSqrt => InstructionClass::Fpu,
            _ => InstructionClass::Alu,
        }
    }

    /// Whether the operation ignores its second operand.
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Rev | Self::Clz | Self::Popcnt | Self::Revb | Self::FSqrt
        )
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Bic => "bic",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Min => "min",
            Self::Max => "max",
            Self::Minu => "minu",
            Self::Maxu => "maxu",
            Self::Seq => "seq",
            Self::Sne => "sne",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Sle => "sle",
            Self::Sleu => "sleu",
            Self::Asr => "asr",
            Self::Lsl => "lsl",
            Self::Lsr => "lsr",
            Self::Sel => "sel",
            Self::Mul => "mul",
            Self::Mulhi => "mulhi",
            Self::Mulhiu => "mulhiu",
            Self::Div => "div",
            Self::Divu => "divu",
            Self::Rem => "rem",
            Self::Remu => "remu",
            Self::Rev => "rev",
            Self::Clz => "clz",
            Self::Popcnt => "popcnt",
            Self::Revb => "revb",
            Self::FAdd => "fadd",
            Self::FSub => "fsub",
            Self::FMul => "fmul",
            Self::FDiv => "fdiv",
            Self::FMin => "fmin",
            Self::FMax => "fmax",
            Self::FSeq => "fseq",
            Self::FSne => "fsne",
            Self::FSlt => "fslt",
            Self::FSle => "fsle",
            Self::Itof => "itof",
            Self::Utof => "utof",
            Self::Ftoi => "ftoi",
            Self::Ftou => "ftou",
            Self::FSqrt => "fsqrt",
        }
    }
}

/// Width and extension of a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadWidth {
    /// 8-bit, sign-extended.
    Byte,
    /// 8-bit, zero-extended.
    ByteUnsigned,
    /// 16-bit, sign-extended.
    Half,
    /// 16-bit, zero-extended.
    HalfUnsigned,
    /// 32-bit.
    Word,
}

impl LoadWidth {
    /// Access size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte | Self::ByteUnsigned => 1,
            Self::Half | Self::HalfUnsigned => 2,
            Self::Word => 4,
        }
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Byte => "ldb",
            Self::ByteUnsigned => "ldub",
            Self::Half => "ldh",
            Self::HalfUnsigned => "lduh",
            Self::Word => "ldw",
        }
    }
}

/// Width of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreWidth {
    /// 8-bit.
    Byte,
    /// 16-bit.
    Half,
    /// 32-bit.
    Word,
}

impl StoreWidth {
    /// Access size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Byte => "stb",
            Self::Half => "sth",
            Self::Word => "stw",
        }
    }
}

/// Second ALU operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A scalar register.
    Reg(u8),
    /// An immediate (already sign-extended).
    Imm(u32),
}

/// Address offset of a memory instruction, or the stride of a strided vector access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Offset {
    /// Constant byte offset.
    Imm(i32),
    /// Register scaled by `1 << shift`.
    Indexed {
        /// Index register.
        rb: u8,
        /// Left shift applied to the index.
        shift: u8,
    },
}

/// Second operand of a vector ALU instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorOperand {
    /// Same scalar value (register or immediate) for every lane.
    Scalar(Operand),
    /// Lane `k` of vector register `vb`.
    Vector(u8),
    /// Fold: lane `k` of `vb` combined with lane `k + VL` of `va`.
    Fold(u8),
}

/// Address generation of a vector memory instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorAddressing {
    /// `addr_k = ra + k * stride`.
    Stride(Offset),
    /// `addr_k = ra + (vb[k] << shift)`.
    Gather {
        /// Vector register holding per-lane offsets.
        vb: u8,
        /// Left shift applied to each offset.
        shift: u8,
    },
}

/// Condition tested by a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchCond {
    /// `r == 0`
    Zero,
    /// `r != 0`
    NotZero,
    /// `r == 0xFFFF_FFFF`
    Set,
    /// `r != 0xFFFF_FFFF`
    NotSet,
    /// `r < 0` (signed)
    Negative,
    /// `r >= 0` (signed)
    NonNegative,
    /// `r <= 0` (signed)
    NonPositive,
    /// `r > 0` (signed)
    Positive,
}

impl BranchCond {
    /// Evaluates the condition against a register value.
    pub const fn holds(self, val: u32) -> bool {
        let s = val as i32;
        match self {
            Self::Zero => val == 0,
            Self::NotZero => val != 0,
            Self::Set => val == u32::MAX,
            Self::NotSet => val != u32::MAX,
            Self::Negative => s < 0,
            Self::NonNegative => s >= 0,
            Self::NonPositive => s <= 0,
            Self::Positive => s > 0,
        }
    }

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Zero => "bz",
            Self::NotZero => "bnz",
            Self::Set => "bs",
            Self::NotSet => "bns",
            Self::Negative => "blt",
            Self::NonNegative => "bge",
            Self::NonPositive => "ble",
            Self::Positive => "bgt",
        }
    }
}

/// System-group operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemOp {
    /// No operation.
    Nop,
    /// Memory barrier; a no-op in this sequential model.
    Sync,
    /// Halt the processor.
    Wait,
}

/// Execution class; selects the statistics bucket and the cycle cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstructionClass {
    /// Integer arithmetic and logic, immediates, address generation.
    Alu,
    /// Integer multiply and divide.
    MulDiv,
    /// Floating point.
    Fpu,
    /// Scalar load.
    Load,
    /// Scalar store.
    Store,
    /// Conditional branch.
    Branch,
    /// Unconditional jump and call (including return).
    Jump,
    /// Any vector instruction.
    Vector,
    /// System group.
    System,
}

impl InstructionClass {
    /// Static cycle cost of one instruction of this class.
    ///
    /// Vector instructions additionally scale with their active lane count, see
    /// [`Instruction::cycles`].
    pub const fn base_cycles(self) -> u64 {
        match self {
            Self::Alu | Self::Store | Self::Branch | Self::System | Self::Vector => 1,
            Self::Fpu | Self::Load | Self::Jump => 2,
            Self::MulDiv => 3,
        }
    }
}

/// A decoded instruction.
///
/// Register fields are 5-bit indices. Vector variants name vector registers in their `v*`
/// fields and scalar registers in their `ra`/`rb` fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Scalar ALU / FPU operation: `rd = op(ra, b)`.
    Alu {
        /// Operation.
        op: AluOp,
        /// Destination.
        rd: u8,
        /// First source.
        ra: u8,
        /// Second source.
        b: Operand,
    },
    /// Scalar load: `rd = mem[ra + offset]`.
    Load {
        /// Width / extension.
        width: LoadWidth,
        /// Destination.
        rd: u8,
        /// Base register.
        ra: u8,
        /// Offset.
        offset: Offset,
    },
    /// Address generation: `rd = ra + offset`.
    LoadEffectiveAddress {
        /// Destination.
        rd: u8,
        /// Base register.
        ra: u8,
        /// Offset.
        offset: Offset,
    },
    /// Scalar store: `mem[ra + offset] = rs`.
    Store {
        /// Width.
        width: StoreWidth,
        /// Source value register.
        rs: u8,
        /// Base register.
        ra: u8,
        /// Offset.
        offset: Offset,
    },
    /// Conditional PC-relative branch.
    Branch {
        /// Condition.
        cond: BranchCond,
        /// Tested register.
        rs: u8,
        /// Byte offset from the branch.
        offset: i32,
    },
    /// `PC = base + offset`; with `link`, `LR = PC + 4`.
    Jump {
        /// Whether the return address is written to `LR`.
        link: bool,
        /// Base register (`PC` for relative jumps, `LR` for returns).
        base: u8,
        /// Byte offset.
        offset: i32,
    },
    /// `rd = value` (LDI, LDHI, LDHIO).
    LoadImmediate {
        /// Destination.
        rd: u8,
        /// Constant.
        value: u32,
    },
    /// `rd = PC + offset` (ADDPC, ADDPCHI).
    AddPc {
        /// Destination.
        rd: u8,
        /// Byte offset.
        offset: u32,
    },
    /// Lane-wise ALU / FPU operation.
    VectorAlu {
        /// Operation.
        op: AluOp,
        /// Destination vector.
        vd: u8,
        /// First source vector.
        va: u8,
        /// Second source.
        b: VectorOperand,
    },
    /// Lane-wise load.
    VectorLoad {
        /// Width / extension.
        width: LoadWidth,
        /// Destination vector.
        vd: u8,
        /// Scalar base register.
        ra: u8,
        /// Address generation.
        addressing: VectorAddressing,
    },
    /// Lane-wise address generation.
    VectorLoadEffectiveAddress {
        /// Destination vector.
        vd: u8,
        /// Scalar base register.
        ra: u8,
        /// Address generation.
        addressing: VectorAddressing,
    },
    /// Lane-wise store.
    VectorStore {
        /// Width.
        width: StoreWidth,
        /// Source vector.
        vs: u8,
        /// Scalar base register.
        ra: u8,
        /// Address generation.
        addressing: VectorAddressing,
    },
    /// System group.
    System(SystemOp),
}

impl Instruction {
    /// Execution class.
    pub const fn class(&self) -> InstructionClass {
        match self {
            Self::Alu { op, .. } => op.class(),
            Self::Load { .. } => InstructionClass::Load,
            Self::Store { .. } => InstructionClass::Store,
            Self::LoadEffectiveAddress { .. } | Self::LoadImmediate { .. } | Self::AddPc { .. } => {
                InstructionClass::Alu
            }
            Self::Branch { .. } => InstructionClass::Branch,
            Self::Jump { .. } => InstructionClass::Jump,
            Self::VectorAlu { .. }
            | Self::VectorLoad { .. }
            | Self::VectorLoadEffectiveAddress { .. }
            | Self::VectorStore { .. } => InstructionClass::Vector,
            Self::System(_) => InstructionClass::System,
        }
    }

    /// Whether this is a vector instruction.
    pub const fn is_vector(&self) -> bool {
        matches!(self.class(), InstructionClass::Vector)
    }

    /// Cycle cost given the number of active vector lanes.
    pub fn cycles(&self, active_lanes: usize) -> u64 {
        let base = self.class().base_cycles();
        if self.is_vector() {
            base.max(active_lanes as u64)
        } else {
            base
        }
    }
}
