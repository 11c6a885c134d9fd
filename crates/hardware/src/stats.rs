//! Simulation statistics collection and reporting.
//!
//! This module tracks execution metrics for the simulator. It provides:
//! 1. **Cycles and throughput:** Total cycles, retired instructions and host time.
//! 2. **Instruction mix:** Counts by class (ALU, mul/div, FPU, load, store, branch, jump,
//!    vector, system).
//! 3. **Control flow and vectors:** Taken branches and vector lanes processed.
//!
//! Statistics are owned by the engine while it runs and read by the caller after halt.

use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;

use crate::isa::instruction::InstructionClass;

/// Simulation statistics structure tracking all execution metrics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Option<Instant>,
    /// Host wall-clock seconds between `start` and `stop`.
    pub host_seconds: f64,
    /// Total simulated cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired.
    pub instructions_retired: u64,

    /// Integer ALU, immediate and address-generation instructions retired.
    pub inst_alu: u64,
    /// Multiply / divide instructions retired.
    pub inst_muldiv: u64,
    /// Floating-point instructions retired.
    pub inst_fpu: u64,
    /// Scalar load instructions retired.
    pub inst_load: u64,
    /// Scalar store instructions retired.
    pub inst_store: u64,
    /// Conditional branch instructions retired.
    pub inst_branch: u64,
    /// Jump, call and return instructions retired.
    pub inst_jump: u64,
    /// Vector instructions retired.
    pub inst_vector: u64,
    /// System instructions retired.
    pub inst_system: u64,

    /// Conditional branches that were taken.
    pub branches_taken: u64,
    /// Total active lanes over all retired vector instructions.
    pub vector_lanes: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"vector"`. Pass an empty slice
/// to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "vector"];

impl SimStats {
    /// Marks the start of host timing.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stops host timing and records the elapsed seconds.
    pub fn stop(&mut self) {
        if let Some(t) = self.start_time.take() {
            self.host_seconds = t.elapsed().as_secs_f64();
        }
    }

    /// Records one retired instruction.
    ///
    /// # Arguments
    ///
    /// * `class`  - Execution class of the instruction.
    /// * `cycles` - Cycles charged for it.
    /// * `lanes`  - Active lanes (ignored for scalar classes).
    pub fn record(&mut self, class: InstructionClass, cycles: u64, lanes: usize) {
        self.cycles += cycles;
        self.instructions_retired += 1;
        let bucket = match class {
            InstructionClass::Alu => &mut self.inst_alu,
            InstructionClass::MulDiv => &mut self.inst_muldiv,
            InstructionClass::Fpu => &mut self.inst_fpu,
            InstructionClass::Load => &mut self.inst_load,
            InstructionClass::Store => &mut self.inst_store,
            InstructionClass::Branch => &mut self.inst_branch,
            InstructionClass::Jump => &mut self.inst_jump,
            InstructionClass::Vector => {
                self.vector_lanes += lanes as u64;
                &mut self.inst_vector
            }
            InstructionClass::System => &mut self.inst_system,
        };
        *bucket += 1;
    }

    /// Seconds elapsed so far: the recorded run time once stopped, else the live timer.
    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time
            .map_or(self.host_seconds, |t| t.elapsed().as_secs_f64())
    }

    /// Renders the requested sections as text.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. An empty slice renders
    /// every section.
    pub fn report_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.elapsed_seconds().max(f64::MIN_POSITIVE);
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);
        let mut out = String::new();

        let _ = writeln!(out, "\n==========================================================");
        let _ = writeln!(out, "MR32 SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================================");
        if want("summary") {
            let ipc = self.instructions_retired as f64 / cyc as f64;
            let cpi = cyc as f64 / instr as f64;
            let mips = (self.instructions_retired as f64 / seconds) / 1_000_000.0;
            let _ = writeln!(out, "host_seconds             {:.4} s", self.elapsed_seconds());
            let _ = writeln!(out, "sim_cycles               {}", self.cycles);
            let _ = writeln!(out, "sim_insts                {}", self.instructions_retired);
            let _ = writeln!(out, "sim_ipc                  {ipc:.4}");
            let _ = writeln!(out, "sim_cpi                  {cpi:.4}");
            let _ = writeln!(out, "sim_mips                 {mips:.2}");
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let total = instr as f64;
            let _ = writeln!(out, "INSTRUCTION MIX");
            for (name, count) in [
                ("op.alu", self.inst_alu),
                ("op.muldiv", self.inst_muldiv),
                ("op.fpu", self.inst_fpu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.jump", self.inst_jump),
                ("op.vector", self.inst_vector),
                ("op.system", self.inst_system),
            ] {
                let _ = writeln!(
                    out,
                    "  {name:<22} {count} ({:.2}%)",
                    (count as f64 / total) * 100.0
                );
            }
            let taken = if self.inst_branch > 0 {
                100.0 * (self.branches_taken as f64 / self.inst_branch as f64)
            } else {
                0.0
            };
            let _ = writeln!(out, "  branch.taken           {} ({taken:.2}%)", self.branches_taken);
            let _ = writeln!(out, "----------------------------------------------------------");
        }
        if want("vector") {
            let avg = if self.inst_vector > 0 {
                self.vector_lanes as f64 / self.inst_vector as f64
            } else {
                0.0
            };
            let _ = writeln!(out, "VECTOR");
            let _ = writeln!(out, "  vector.lanes           {}", self.vector_lanes);
            let _ = writeln!(out, "  vector.avg_lanes       {avg:.2}");
        }
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Prints only the requested statistics sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.report_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
