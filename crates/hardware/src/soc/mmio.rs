//! MMIO Constants Window.
//!
//! A 64-byte block of 32-bit little-endian words at a fixed base address, written once before
//! the CPU starts. Programs read it to discover the machine they are running on. The only word
//! that changes afterwards is `FRAMENO`, which the presentation loop bumps once per frame.

use tracing::debug;

use crate::common::error::MemoryError;
use crate::config::MmioConfig;
use crate::soc::memory::Memory;

/// Size of the window in bytes.
pub const WINDOW_BYTES: u64 = 64;

/// CPU clock frequency in Hz.
pub const CPUCLK: u32 = 8;
/// Video RAM size in bytes.
pub const VRAMSIZE: u32 = 12;
/// Native video width.
pub const VIDWIDTH: u32 = 20;
/// Native video height.
pub const VIDHEIGHT: u32 = 24;
/// Video frame rate, 16.16 fixed point.
pub const VIDFPS: u32 = 28;
/// Presented frame counter.
pub const FRAMENO: u32 = 32;
/// Switch state.
pub const SWITCHES: u32 = 40;

/// An installed constants window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MmioWindow {
    base: u32,
}

impl MmioWindow {
    /// Writes the constants into `memory`.
    ///
    /// Returns `None` without touching memory when the window does not fit, which is the case
    /// for any RAM smaller than `base + 64`.
    pub fn install(memory: &Memory, config: &MmioConfig) -> Result<Option<Self>, MemoryError> {
        if memory.capacity() < u64::from(config.base) + WINDOW_BYTES {
            debug!(
                base = format_args!("{:#010x}", config.base),
                capacity = memory.capacity(),
                "MMIO window does not fit in RAM, skipped"
            );
            return Ok(None);
        }
        let window = Self { base: config.base };
        for (offset, value) in [
            (CPUCLK, config.cpu_clk),
            (VRAMSIZE, config.vram_size),
            (VIDWIDTH, config.vid_width),
            (VIDHEIGHT, config.vid_height),
            (VIDFPS, config.vid_fps),
            (SWITCHES, config.switches),
        ] {
            memory.store32(window.addr(offset), value)?;
        }
        Ok(Some(window))
    }

    /// Base address of the window.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Absolute address of the word at `offset`.
    pub fn addr(&self, offset: u32) -> u32 {
        self.base.wrapping_add(offset)
    }

    /// Publishes the number of the frame about to be presented.
    pub fn set_frame_number(&self, memory: &Memory, frame: u32) -> Result<(), MemoryError> {
        memory.store32(self.addr(FRAMENO), frame)
    }
}
