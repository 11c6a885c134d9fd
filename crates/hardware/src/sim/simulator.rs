//! Simulator: orchestrates memory, loader, CPU task and presentation for one run.
//!
//! The run sequence is fixed:
//! 1. **Setup:** Validate the config, allocate RAM, install the MMIO constants window.
//! 2. **Load:** Place the program image in RAM.
//! 3. **Execute:** Spawn the CPU task, optionally drive the presentation loop on this thread.
//! 4. **Report:** Always join the task, log abnormal halts, perform the configured dump, return the
//!    exit status.

use std::path::Path;

use tracing::{error, info, warn};

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::cpu::{Cpu, HaltReason};
use crate::sim::controller::{ExecutionController, TaskOutcome};
use crate::sim::loader::{self, LoadedImage};
use crate::sim::presentation::{Display, present_until_closed};
use crate::soc::memory::Memory;
use crate::soc::mmio::MmioWindow;
use crate::stats::SimStats;
use crate::trace::{Tracer, open_sink};

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Process exit code.
    pub exit_code: i32,
    /// Halt reason; `None` if the CPU task panicked.
    pub reason: Option<HaltReason>,
    /// Final CPU state; `None` if the CPU task panicked.
    pub cpu: Option<Box<Cpu>>,
    /// Frames presented by the presentation loop.
    pub frames: u32,
}

impl RunReport {
    /// Execution statistics, if the task did not panic.
    pub fn stats(&self) -> Option<&SimStats> {
        self.cpu.as_deref().map(Cpu::stats)
    }
}

/// Top-level simulator: configuration plus the shared RAM.
#[derive(Debug)]
pub struct Simulator {
    config: Config,
    memory: Memory,
    mmio: Option<MmioWindow>,
}

impl Simulator {
    /// Validates `config`, allocates RAM and writes the MMIO constants.
    pub fn new(config: Config) -> Result<Self, SimError> {
        config.validate()?;
        let memory = Memory::new(config.memory.ram_size)?;
        let mmio = MmioWindow::install(&memory, &config.mmio)?;
        Ok(Self {
            config,
            memory,
            mmio,
        })
    }

    /// The configuration of this run.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to RAM.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The installed MMIO window, if RAM is large enough to hold it.
    pub fn mmio(&self) -> Option<MmioWindow> {
        self.mmio
    }

    /// Loads the program image at `path`, honouring the configured address override.
    pub fn load_program(&self, path: &Path) -> Result<LoadedImage, SimError> {
        Ok(loader::load_image(
            path,
            &self.memory,
            self.config.memory.load_addr,
        )?)
    }

    /// Loads an in-memory program image, honouring the configured address override.
    pub fn load_program_bytes(&self, data: &[u8]) -> Result<LoadedImage, SimError> {
        Ok(loader::load_image_bytes(
            data,
            &self.memory,
            self.config.memory.load_addr,
        )?)
    }

    /// Builds a reset CPU entering at the image start address, with the configured tracer.
    pub fn build_cpu(&self, image: &LoadedImage) -> Result<Cpu, SimError> {
        let tracer = Tracer::new(open_sink(&self.config.trace)?);
        Ok(Cpu::new(self.memory.clone(), image.start_addr).with_tracer(tracer))
    }

    /// Runs the loaded program to completion.
    ///
    /// With a display, the presentation loop runs on the calling thread until it closes; the
    /// CPU task is joined in every case before this returns.
    pub fn run(
        &self,
        image: &LoadedImage,
        display: Option<&mut dyn Display>,
    ) -> Result<RunReport, SimError> {
        let cpu = self.build_cpu(image)?;
        info!(
            entry = format_args!("{:#010x}", image.start_addr),
            max_cycles = ?self.config.general.max_cycles,
            "starting simulation"
        );
        let controller = ExecutionController::spawn(cpu, self.config.general.max_cycles)?;

        let frames = match display {
            Some(display) => present_until_closed(
                display,
                &self.memory,
                &self.config.video,
                self.mmio,
                &controller,
            ),
            None => 0,
        };

        let outcome = controller.join();
        let exit_code = outcome.exit_code();
        let reason = outcome.reason();
        log_halt(reason, exit_code);
        let cpu = match outcome {
            TaskOutcome::Halted { cpu, .. } => Some(cpu),
            TaskOutcome::Panicked(_) => None,
        };
        if let (true, Some(cpu)) = (self.config.general.verbose, cpu.as_deref()) {
            info!(
                instructions = cpu.stats.instructions_retired,
                cycles = cpu.stats.cycles,
                "run finished"
            );
        }

        if let (Some(dump), Some(cpu)) = (&self.config.dump, cpu.as_deref()) {
            match cpu.dump_ram_to_file(dump.begin, dump.end, &dump.path) {
                Ok(n) => info!(bytes = n, path = %dump.path.display(), "memory dumped"),
                Err(e) => error!(error = %e, path = %dump.path.display(), "memory dump failed"),
            }
        }

        Ok(RunReport {
            exit_code,
            reason,
            cpu,
            frames,
        })
    }
}

/// Reports halts other than a normal program exit on the error stream.
fn log_halt(reason: Option<HaltReason>, exit_code: i32) {
    match reason {
        Some(HaltReason::Fault(trap)) => error!(
            pc = format_args!("{:#010x}", trap.pc()),
            addr = format_args!("{:#010x}", trap.fault_addr()),
            exit_code,
            "cpu fault: {trap}"
        ),
        Some(reason @ (HaltReason::Terminated { .. } | HaltReason::CycleLimit { .. })) => {
            warn!(exit_code, "run stopped early: {reason}");
        }
        Some(_) => {}
        None => error!(exit_code, "cpu task panicked"),
    }
}
