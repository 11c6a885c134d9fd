//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline machine constants (RAM size, MMIO window, framebuffer mode).
//! 2. **Structures:** Hierarchical config for general, memory, video, MMIO, trace and dump.
//! 3. **Validation:** Checks performed once, before memory is allocated or a thread starts.
//!
//! Configuration is supplied via JSON (`--config`) or built from `Config::default()` by the CLI.
//! It is immutable once the simulation starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::constants::MAX_RAM_SIZE;
use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Total size of RAM (the whole 32-bit address space).
    pub const RAM_SIZE: u64 = 1 << 32;

    /// Framebuffer base address.
    pub const VIDEO_ADDR: u32 = 0x4000_0000;

    /// Framebuffer width in pixels.
    pub const VIDEO_WIDTH: u32 = 320;

    /// Framebuffer height in pixels.
    pub const VIDEO_HEIGHT: u32 = 180;

    /// Framebuffer depth in bits per pixel.
    pub const VIDEO_DEPTH: u32 = 8;

    /// Display refresh rate in Hz.
    pub const REFRESH_HZ: u32 = 60;

    /// Base address of the MMIO constants window.
    pub const MMIO_BASE: u32 = 0xC000_0000;

    /// Reported CPU clock frequency in Hz.
    pub const CPU_CLK: u32 = 70_000_000;

    /// Reported video RAM size in bytes.
    pub const VRAM_SIZE: u32 = 128 * 1024;

    /// Reported native video width.
    pub const VID_WIDTH: u32 = 1920;

    /// Reported native video height.
    pub const VID_HEIGHT: u32 = 1080;

    /// Reported video frame rate (16.16 fixed point).
    pub const VID_FPS: u32 = 60 << 16;

    /// Reported switch state.
    pub const SWITCHES: u32 = 4;

    /// First byte of the default dump range (start of VRAM).
    pub const DUMP_BEGIN: u32 = 0x4000_0000;

    /// One past the last byte of the default dump range.
    pub const DUMP_END: u32 = 0x4004_0000;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use mr32sim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.ram_size, 1 << 32);
/// assert!(!config.video.enabled);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use mr32sim_core::config::{Config, TraceFormat};
///
/// let json = r#"{
///     "general": { "verbose": true, "max_cycles": 1000000 },
///     "memory": { "ram_size": 16777216 },
///     "video": { "enabled": true, "depth": 16 },
///     "trace": { "path": "run.trace", "format": "Text" }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.general.max_cycles, Some(1_000_000));
/// assert_eq!(config.video.width, 320);
/// assert_eq!(config.trace.format, TraceFormat::Text);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// RAM size and load placement
    pub memory: MemoryConfig,
    /// Framebuffer window and presentation
    pub video: VideoConfig,
    /// MMIO constants window
    pub mmio: MmioConfig,
    /// Instruction trace output
    pub trace: TraceConfig,
    /// Memory range dump after the run
    pub dump: Option<DumpConfig>,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks the configuration for values the simulator cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ram = self.memory.ram_size;
        if ram == 0 || ram > MAX_RAM_SIZE {
            return Err(ConfigError::RamSize(ram));
        }
        if self.video.enabled {
            if !matches!(self.video.depth, 8 | 16 | 32) {
                return Err(ConfigError::VideoDepth(self.video.depth));
            }
            if self.video.width == 0 || self.video.height == 0 || self.video.refresh_hz == 0 {
                return Err(ConfigError::VideoMode {
                    width: self.video.width,
                    height: self.video.height,
                    refresh_hz: self.video.refresh_hz,
                });
            }
            let bytes = self.video.frame_bytes();
            if bytes > MAX_RAM_SIZE {
                return Err(ConfigError::FrameSize(bytes));
            }
        }
        if let Some(dump) = self.dump.as_ref().filter(|d| d.begin > d.end) {
            return Err(ConfigError::DumpRange {
                begin: dump.begin,
                end: dump.end,
            });
        }
        Ok(())
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Print the exit code and statistics after the run.
    pub verbose: bool,

    /// Cycle budget; `None` runs until the program halts.
    pub max_cycles: Option<u64>,
}

/// RAM configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// RAM size in bytes, `1..=2^32`.
    pub ram_size: u64,

    /// Load address override. When set, the image has no address header.
    pub load_addr: Option<u32>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_size: defaults::RAM_SIZE,
            load_addr: None,
        }
    }
}

/// Framebuffer and presentation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Run the presentation loop.
    pub enabled: bool,
    /// Framebuffer base address.
    pub addr: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per pixel: 8 (grayscale), 16 (RGB565) or 32 (RGBA).
    pub depth: u32,
    /// Frames per second of the presentation loop.
    pub refresh_hz: u32,
    /// Write the final frame to this file as a binary PPM.
    pub snapshot: Option<PathBuf>,
}

impl VideoConfig {
    /// Size of the framebuffer window in bytes.
    pub fn frame_bytes(&self) -> u64 {
        u64::from(self.width)
            .saturating_mul(u64::from(self.height))
            .saturating_mul(u64::from(self.depth / 8))
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: defaults::VIDEO_ADDR,
            width: defaults::VIDEO_WIDTH,
            height: defaults::VIDEO_HEIGHT,
            depth: defaults::VIDEO_DEPTH,
            refresh_hz: defaults::REFRESH_HZ,
            snapshot: None,
        }
    }
}

/// Values exposed through the MMIO constants window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MmioConfig {
    /// Base address of the window.
    pub base: u32,
    /// CPU clock frequency in Hz.
    pub cpu_clk: u32,
    /// Video RAM size in bytes.
    pub vram_size: u32,
    /// Native video width.
    pub vid_width: u32,
    /// Native video height.
    pub vid_height: u32,
    /// Video frame rate, 16.16 fixed point.
    pub vid_fps: u32,
    /// Switch state.
    pub switches: u32,
}

impl Default for MmioConfig {
    fn default() -> Self {
        Self {
            base: defaults::MMIO_BASE,
            cpu_clk: defaults::CPU_CLK,
            vram_size: defaults::VRAM_SIZE,
            vid_width: defaults::VID_WIDTH,
            vid_height: defaults::VID_HEIGHT,
            vid_fps: defaults::VID_FPS,
            switches: defaults::SWITCHES,
        }
    }
}

/// Encoding of the instruction trace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TraceFormat {
    /// Fixed-size little-endian records.
    #[default]
    #[serde(alias = "binary")]
    Binary,
    /// One disassembled line per instruction.
    #[serde(alias = "text")]
    Text,
}

/// Instruction trace configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Trace file; `None` disables tracing.
    pub path: Option<PathBuf>,
    /// Record encoding.
    pub format: TraceFormat,
}

/// Memory range dumped to a file after the run.
#[derive(Debug, Clone, Deserialize)]
pub struct DumpConfig {
    /// Output file.
    pub path: PathBuf,
    /// First byte.
    #[serde(default = "DumpConfig::default_begin")]
    pub begin: u32,
    /// One past the last byte.
    #[serde(default = "DumpConfig::default_end")]
    pub end: u32,
}

impl DumpConfig {
    /// Returns the default start of the dump range.
    fn default_begin() -> u32 {
        defaults::DUMP_BEGIN
    }

    /// Returns the default end of the dump range.
    fn default_end() -> u32 {
        defaults::DUMP_END
    }

    /// Dump of the default VRAM range into `path`.
    pub fn vram(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            begin: defaults::DUMP_BEGIN,
            end: defaults::DUMP_END,
        }
    }
}
