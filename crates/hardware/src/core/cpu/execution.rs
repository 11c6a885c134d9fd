//! Main Execution Loop.
//!
//! This module implements the sequential fetch-decode-execute cycle. Each step performs:
//! 1. **Halt Checks:** The termination flag and the sentinel return address.
//! 2. **Fetch and Decode:** One 32-bit word into the closed `Instruction` enum.
//! 3. **Budget Check:** The instruction's cost must fit in the remaining cycle budget.
//! 4. **Execute:** Operand reads, ALU work and memory side effects, producing an `Outcome`.
//! 5. **Commit:** Register writes, PC update, statistics and the trace record.
//!
//! A faulting instruction never reaches commit, so it is not counted. Vector stores write
//! lane by lane during execute; a fault on lane `k` leaves lanes `0..k` written.

use tracing::debug;

use super::{Cpu, HaltReason};
use crate::common::Trap;
use crate::common::constants::{END_OF_PROGRAM_LR, INSTRUCTION_SIZE};
use crate::core::arch::vreg::Lanes;
use crate::core::units::alu::Alu;
use crate::isa::abi;
use crate::isa::decode::decode;
use crate::isa::instruction::{
    Instruction, Offset, Operand, SystemOp, VectorAddressing, VectorOperand,
};
use crate::trace::{MemAccess, MemKind, RegDelta, TraceRecord};

/// Architectural effects of one executed instruction, applied at commit.
#[derive(Debug)]
struct Outcome {
    next_pc: u32,
    scalar: Option<(u8, u32)>,
    vector: Option<(u8, Lanes)>,
    mem: Option<MemAccess>,
    taken: bool,
    halt: bool,
}

impl Outcome {
    fn next(pc: u32) -> Self {
        Self {
            next_pc: pc.wrapping_add(INSTRUCTION_SIZE),
            scalar: None,
            vector: None,
            mem: None,
            taken: false,
            halt: false,
        }
    }

    fn write(mut self, rd: u8, val: u32) -> Self {
        self.scalar = Some((rd, val));
        self
    }
}

impl Cpu {
    /// Runs until the engine halts.
    ///
    /// # Arguments
    ///
    /// * `max_cycles` - Cycle budget; `None` runs without a limit.
    ///
    /// # Returns
    ///
    /// The halt reason, also available afterwards through [`Cpu::halt_reason`].
    pub fn run(&mut self, max_cycles: Option<u64>) -> HaltReason {
        self.stats.start();
        let reason = loop {
            if let Some(reason) = self.step(max_cycles) {
                break reason;
            }
        };
        self.stats.stop();
        self.tracer.flush();
        reason
    }

    /// Executes one instruction.
    ///
    /// Returns `Some(reason)` once the engine has halted; every later call returns the same
    /// reason without executing anything.
    pub fn step(&mut self, max_cycles: Option<u64>) -> Option<HaltReason> {
        if let Some(reason) = self.halt {
            return Some(reason);
        }
        let reason = self.advance(max_cycles).err()?;
        debug!(%reason, pc = format_args!("{:#010x}", self.pc), "cpu halted");
        self.halt = Some(reason);
        Some(reason)
    }

    fn advance(&mut self, max_cycles: Option<u64>) -> Result<(), HaltReason> {
        let pc = self.pc;
        if self.termination.is_requested() {
            return Err(HaltReason::Terminated { pc });
        }
        if pc == END_OF_PROGRAM_LR {
            return Err(HaltReason::Returned {
                status: self.regs.read(abi::REG_RESULT),
            });
        }

        let word = self.fetch(pc).map_err(HaltReason::Fault)?;
        let inst = decode(word).ok_or(HaltReason::Fault(Trap::IllegalInstruction { word, pc }))?;

        let lanes = self.regs.active_lanes();
        let cost = inst.cycles(lanes);
        if max_cycles.is_some_and(|limit| self.stats.cycles + cost > limit) {
            return Err(HaltReason::CycleLimit {
                cycles: self.stats.cycles,
            });
        }

        let out = self.execute(&inst, pc, lanes).map_err(HaltReason::Fault)?;
        let halt = out.halt;
        self.commit(pc, word, inst, out, cost, lanes);

        if halt {
            return Err(HaltReason::HaltInstruction {
                pc,
                status: self.regs.read(abi::REG_RESULT),
            });
        }
        Ok(())
    }

    /// Reads a scalar register as seen by the instruction at `pc`.
    #[inline(always)]
    fn reg(&self, idx: u8, pc: u32) -> u32 {
        if idx as usize == abi::REG_PC {
            pc
        } else {
            self.regs.read(idx as usize)
        }
    }

    #[inline(always)]
    fn operand(&self, b: Operand, pc: u32) -> u32 {
        match b {
            Operand::Reg(r) => self.reg(r, pc),
            Operand::Imm(imm) => imm,
        }
    }

    #[inline(always)]
    fn offset(&self, offset: Offset, pc: u32) -> u32 {
        match offset {
            Offset::Imm(imm) => imm as u32,
            Offset::Indexed { rb, shift } => self.reg(rb, pc) << shift,
        }
    }

    /// Address of lane `k` of a vector memory access.
    #[inline(always)]
    fn lane_addr(&self, base: u32, addressing: VectorAddressing, k: usize, pc: u32) -> u32 {
        match addressing {
            VectorAddressing::Stride(stride) => {
                base.wrapping_add((k as u32).wrapping_mul(self.offset(stride, pc)))
            }
            VectorAddressing::Gather { vb, shift } => {
                base.wrapping_add(self.regs.read_lane(vb as usize, k) << shift)
            }
        }
    }

    fn execute(&self, inst: &Instruction, pc: u32, lanes: usize) -> Result<Outcome, Trap> {
        let out = Outcome::next(pc);
        let out = match *inst {
            Instruction::Alu { op, rd, ra, b } => {
                let a = self.reg(ra, pc);
                let b = self.operand(b, pc);
                let d = self.reg(rd, pc);
                out.write(rd, Alu::execute(op, a, b, d))
            }
            Instruction::Load {
                width,
                rd,
                ra,
                offset,
            } => {
                let addr = self.reg(ra, pc).wrapping_add(self.offset(offset, pc));
                let val = self.load(width, addr, pc)?;
                Outcome {
                    mem: Some(MemAccess {
                        addr,
                        width: width.bytes() as u8,
                        kind: MemKind::Load,
                    }),
                    ..out.write(rd, val)
                }
            }
            Instruction::LoadEffectiveAddress { rd, ra, offset } => {
                out.write(rd, self.reg(ra, pc).wrapping_add(self.offset(offset, pc)))
            }
            Instruction::Store {
                width,
                rs,
                ra,
                offset,
            } => {
                let addr = self.reg(ra, pc).wrapping_add(self.offset(offset, pc));
                self.store(width, addr, self.reg(rs, pc), pc)?;
                Outcome {
                    mem: Some(MemAccess {
                        addr,
                        width: width.bytes() as u8,
                        kind: MemKind::Store,
                    }),
                    ..out
                }
            }
            Instruction::Branch { cond, rs, offset } => {
                if cond.holds(self.reg(rs, pc)) {
                    Outcome {
                        next_pc: pc.wrapping_add(offset as u32),
                        taken: true,
                        ..out
                    }
                } else {
                    out
                }
            }
            Instruction::Jump { link, base, offset } => {
                let target = self.reg(base, pc).wrapping_add(offset as u32);
                let out = Outcome {
                    next_pc: target,
                    ..out
                };
                if link {
                    out.write(abi::REG_LR as u8, pc.wrapping_add(INSTRUCTION_SIZE))
                } else {
                    out
                }
            }
            Instruction::LoadImmediate { rd, value } => out.write(rd, value),
            Instruction::AddPc { rd, offset } => out.write(rd, pc.wrapping_add(offset)),
            Instruction::VectorAlu { op, vd, va, b } => {
                let mut result = self.regs.read_v(vd as usize);
                let vl = self.regs.read(abi::REG_VL) as usize;
                for (k, lane) in result.iter_mut().enumerate().take(lanes) {
                    let (a, b) = match b {
                        VectorOperand::Scalar(s) => {
                            (self.regs.read_lane(va as usize, k), self.operand(s, pc))
                        }
                        VectorOperand::Vector(vb) => (
                            self.regs.read_lane(va as usize, k),
                            self.regs.read_lane(vb as usize, k),
                        ),
                        VectorOperand::Fold(vb) => (
                            self.regs.read_lane(va as usize, k.saturating_add(vl)),
                            self.regs.read_lane(vb as usize, k),
                        ),
                    };
                    *lane = Alu::execute(op, a, b, *lane);
                }
                Outcome {
                    vector: Some((vd, result)),
                    ..out
                }
            }
            Instruction::VectorLoad {
                width,
                vd,
                ra,
                addressing,
            } => {
                let base = self.reg(ra, pc);
                let mut result = self.regs.read_v(vd as usize);
                for (k, lane) in result.iter_mut().enumerate().take(lanes) {
                    *lane = self.load(width, self.lane_addr(base, addressing, k, pc), pc)?;
                }
                Outcome {
                    vector: Some((vd, result)),
                    mem: (lanes > 0).then(|| MemAccess {
                        addr: self.lane_addr(base, addressing, 0, pc),
                        width: width.bytes() as u8,
                        kind: MemKind::Load,
                    }),
                    ..out
                }
            }
            Instruction::VectorLoadEffectiveAddress { vd, ra, addressing } => {
                let base = self.reg(ra, pc);
                let mut result = self.regs.read_v(vd as usize);
                for (k, lane) in result.iter_mut().enumerate().take(lanes) {
                    *lane = self.lane_addr(base, addressing, k, pc);
                }
                Outcome {
                    vector: Some((vd, result)),
                    ..out
                }
            }
            Instruction::VectorStore {
                width,
                vs,
                ra,
                addressing,
            } => {
                let base = self.reg(ra, pc);
                for k in 0..lanes {
                    let val = self.regs.read_lane(vs as usize, k);
                    self.store(width, self.lane_addr(base, addressing, k, pc), val, pc)?;
                }
                Outcome {
                    mem: (lanes > 0).then(|| MemAccess {
                        addr: self.lane_addr(base, addressing, 0, pc),
                        width: width.bytes() as u8,
                        kind: MemKind::Store,
                    }),
                    ..out
                }
            }
            Instruction::System(SystemOp::Nop | SystemOp::Sync) => out,
            Instruction::System(SystemOp::Wait) => Outcome { halt: true, ..out },
        };
        Ok(out)
    }

    fn commit(
        &mut self,
        pc: u32,
        word: u32,
        inst: Instruction,
        out: Outcome,
        cost: u64,
        lanes: usize,
    ) {
        let mut delta = None;
        if let Some((rd, val)) = out.scalar {
            let idx = rd as usize;
            if idx != abi::REG_Z && idx != abi::REG_PC {
                delta = Some(RegDelta {
                    idx: rd,
                    old: self.regs.read(idx),
                    new: val,
                });
                self.regs.write(idx, val);
            }
        }
        let mut written_v = None;
        if let Some((vd, lanes_out)) = out.vector.filter(|(vd, _)| *vd != 0) {
            self.regs.write_v(vd as usize, lanes_out);
            written_v = Some(vd);
        }

        self.pc = out.next_pc;
        self.stats.record(inst.class(), cost, lanes);
        if out.taken {
            self.stats.branches_taken += 1;
        }

        if self.tracer.is_enabled() {
            self.tracer.emit(&TraceRecord {
                pc,
                word,
                inst,
                scalar: delta,
                vector: written_v,
                mem: out.mem,
            });
        }
    }
}
