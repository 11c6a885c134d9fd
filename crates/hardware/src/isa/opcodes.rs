//! Opcode and function-code constants.
//!
//! Format A instructions select their operation with the 7-bit `func` field, format C
//! instructions with the 6-bit major opcode. Both share the numbering below for the integer and
//! memory operations, so `ADD` is `0x05` in either format.

// ── Integer ALU (formats A and C) ──────────────────────────

/// Bitwise AND.
pub const AND: u32 = 0x01;
/// Bitwise OR.
pub const OR: u32 = 0x02;
/// Bitwise XOR.
pub const XOR: u32 = 0x03;
/// Bit clear (`a & !b`).
pub const BIC: u32 = 0x04;
/// Wrapping addition.
pub const ADD: u32 = 0x05;
/// Wrapping subtraction.
pub const SUB: u32 = 0x06;
/// Signed minimum.
pub const MIN: u32 = 0x07;
/// Signed maximum.
pub const MAX: u32 = 0x08;
/// Unsigned minimum.
pub const MINU: u32 = 0x09;
/// Unsigned maximum.
pub const MAXU: u32 = 0x0A;
/// Set if equal.
pub const SEQ: u32 = 0x0B;
/// Set if not equal.
pub const SNE: u32 = 0x0C;
/// Set if less than (signed).
pub const SLT: u32 = 0x0D;
/// Set if less than (unsigned).
pub const SLTU: u32 = 0x0E;
/// Set if less than or equal (signed).
pub const SLE: u32 = 0x0F;
/// Set if less than or equal (unsigned).
pub const SLEU: u32 = 0x10;
/// Arithmetic shift right.
pub const ASR: u32 = 0x11;
/// Logical shift left.
pub const LSL: u32 = 0x12;
/// Logical shift right.
pub const LSR: u32 = 0x13;
/// Bitwise select under the destination mask.
pub const SEL: u32 = 0x14;
/// Multiply (low word).
pub const MUL: u32 = 0x15;
/// Multiply high (signed).
pub const MULHI: u32 = 0x16;
/// Multiply high (unsigned).
pub const MULHIU: u32 = 0x17;
/// Divide (signed).
pub const DIV: u32 = 0x18;
/// Divide (unsigned).
pub const DIVU: u32 = 0x19;
/// Remainder (signed).
pub const REM: u32 = 0x1A;
/// Remainder (unsigned).
pub const REMU: u32 = 0x1B;

// ── Memory (formats A and C) ───────────────────────────────

/// Load byte, sign-extended.
pub const LDB: u32 = 0x20;
/// Load byte, zero-extended.
pub const LDUB: u32 = 0x21;
/// Load half-word, sign-extended.
pub const LDH: u32 = 0x22;
/// Load half-word, zero-extended.
pub const LDUH: u32 = 0x23;
/// Load word.
pub const LDW: u32 = 0x24;
/// Load effective address.
pub const LDEA: u32 = 0x25;
/// Store byte.
pub const STB: u32 = 0x28;
/// Store half-word.
pub const STH: u32 = 0x29;
/// Store word.
pub const STW: u32 = 0x2A;

// ── Floating point (format A only) ─────────────────────────

/// Single-precision add.
pub const FADD: u32 = 0x30;
/// Single-precision subtract.
pub const FSUB: u32 = 0x31;
/// Single-precision multiply.
pub const FMUL: u32 = 0x32;
/// Single-precision divide.
pub const FDIV: u32 = 0x33;
/// Single-precision minimum.
pub const FMIN: u32 = 0x34;
/// Single-precision maximum.
pub const FMAX: u32 = 0x35;
/// Set if equal (float).
pub const FSEQ: u32 = 0x36;
/// Set if not equal (float).
pub const FSNE: u32 = 0x37;
/// Set if less than (float).
pub const FSLT: u32 = 0x38;
/// Set if less than or equal (float).
pub const FSLE: u32 = 0x39;
/// Signed integer to float, scaled by `2^-b`.
pub const ITOF: u32 = 0x3A;
/// Unsigned integer to float, scaled by `2^-b`.
pub const UTOF: u32 = 0x3B;
/// Float to signed integer, scaled by `2^b`.
pub const FTOI: u32 = 0x3C;
/// Float to unsigned integer, scaled by `2^b`.
pub const FTOU: u32 = 0x3D;

// ── Groups (format A only, `rb` selects the sub-operation) ─

/// Single-operand group.
pub const UNARY_GROUP: u32 = 0x7C;
/// System group.
pub const SYSTEM_GROUP: u32 = 0x7F;

/// Unary: bit reverse.
pub const UNARY_REV: u32 = 0;
/// Unary: count leading zeros.
pub const UNARY_CLZ: u32 = 1;
/// Unary: population count.
pub const UNARY_POPCNT: u32 = 2;
/// Unary: byte reverse.
pub const UNARY_REVB: u32 = 3;
/// Unary: single-precision square root.
pub const UNARY_FSQRT: u32 = 4;

/// System: no operation.
pub const SYS_NOP: u32 = 0;
/// System: memory barrier (no-op in this model).
pub const SYS_SYNC: u32 = 1;
/// System: halt the processor.
pub const SYS_WAIT: u32 = 2;

// ── Format D ───────────────────────────────────────────────

/// Top three bits selecting a conditional branch.
pub const D_BRANCH: u32 = 0b110;
/// Top three bits selecting the jump / long-immediate group.
pub const D_LONG: u32 = 0b111;

/// Branch if zero.
pub const BZ: u32 = 0;
/// Branch if not zero.
pub const BNZ: u32 = 1;
/// Branch if all bits set.
pub const BS: u32 = 2;
/// Branch if not all bits set.
pub const BNS: u32 = 3;
/// Branch if negative.
pub const BLT: u32 = 4;
/// Branch if non-negative.
pub const BGE: u32 = 5;
/// Branch if negative or zero.
pub const BLE: u32 = 6;
/// Branch if positive.
pub const BGT: u32 = 7;

/// Jump to register plus offset.
pub const J: u32 = 0;
/// Jump and link.
pub const JL: u32 = 1;
/// Load sign-extended 21-bit immediate.
pub const LDI: u32 = 2;
/// Load immediate into the high 21 bits.
pub const LDHI: u32 = 3;
/// Load immediate into the high 21 bits, low bits set.
pub const LDHIO: u32 = 4;
/// Add word offset to PC.
pub const ADDPC: u32 = 5;
/// Add high immediate to PC.
pub const ADDPCHI: u32 = 6;

/// Lowest major opcode that is not format C.
pub const FORMAT_C_END: u32 = 0x30;
