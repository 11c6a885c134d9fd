//! Trap and Error definitions.
//!
//! This module defines the error handling and trap mechanisms for the simulator. It provides:
//! 1. **Trap Representation:** The fatal faults that halt the CPU (bad memory access, bad encoding).
//! 2. **Subsystem Errors:** Typed failures for memory, loading, configuration and presentation.
//! 3. **Top-level Error:** `SimError`, which every fallible setup step converts into.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::data::AccessType;

/// Fatal CPU traps.
///
/// A trap always halts the engine; it is carried as a value inside the halt reason and never
/// unwinds. There is no trap handler in this architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// A fetch, load or store touched memory outside `[0, capacity)`.
    ///
    /// `addr` is the first byte of the offending access, `pc` the instruction that issued it.
    OutOfBounds {
        /// Faulting address.
        addr: u64,
        /// Address of the faulting instruction.
        pc: u32,
    },

    /// The word at `pc` does not decode to any instruction.
    IllegalInstruction {
        /// The raw instruction word.
        word: u32,
        /// Address of the instruction.
        pc: u32,
    },
}

impl Trap {
    /// Returns the address of the instruction that trapped.
    pub const fn pc(&self) -> u32 {
        match self {
            Self::OutOfBounds { pc, .. } | Self::IllegalInstruction { pc, .. } => *pc,
        }
    }

    /// Returns the faulting address (the data address, or the PC for decode faults).
    pub const fn fault_addr(&self) -> u64 {
        match self {
            Self::OutOfBounds { addr, .. } => *addr,
            Self::IllegalInstruction { pc, .. } => *pc as u64,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { addr, pc } => {
                write!(f, "OutOfBounds(addr={addr:#010x}, pc={pc:#010x})")
            }
            Self::IllegalInstruction { word, pc } => {
                write!(f, "IllegalInstruction(word={word:#010x}, pc={pc:#010x})")
            }
        }
    }
}

impl std::error::Error for Trap {}

/// Memory subsystem failures.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// An access of `width` bytes at `addr` does not fit in `[0, capacity)`.
    #[error("out-of-bounds {} of {width} byte(s) at {addr:#010x} (capacity {capacity:#x})", .access.name())]
    OutOfBounds {
        /// First byte of the access.
        addr: u64,
        /// Access width in bytes.
        width: u64,
        /// Memory capacity in bytes.
        capacity: u64,
        /// Kind of access.
        access: AccessType,
    },

    /// The requested capacity is zero or larger than the 32-bit address space.
    #[error("invalid RAM size {0:#x}")]
    InvalidSize(u64),

    /// The host refused to provide backing storage.
    #[error("unable to allocate {size:#x} bytes of RAM: {source}")]
    Allocation {
        /// Requested size in bytes.
        size: u64,
        /// Host error.
        #[source]
        source: io::Error,
    },
}

/// Program loading failures. All are reported before the CPU task starts.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be opened or read.
    #[error("unable to read program image {}: {source}", .path.display())]
    Read {
        /// Image path.
        path: PathBuf,
        /// Host error.
        #[source]
        source: io::Error,
    },

    /// No address override was given and the image is too short for the 4-byte header.
    #[error("premature end of file: image has {len} byte(s), the address header needs 4")]
    TruncatedHeader {
        /// Image length in bytes.
        len: usize,
    },

    /// The payload does not fit in memory at the resolved start address.
    #[error("program does not fit in RAM: {0}")]
    DoesNotFit(#[from] MemoryError),
}

/// Invalid settings, reported before the engine is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// RAM size outside `1..=4 GiB`.
    #[error("ram size {0:#x} is outside 1..=0x100000000")]
    RamSize(u64),

    /// Unsupported framebuffer depth.
    #[error("unsupported framebuffer depth {0} (expected 8, 16 or 32)")]
    VideoDepth(u32),

    /// Framebuffer dimensions or refresh rate are zero while video is enabled.
    #[error("video mode {width}x{height} @ {refresh_hz} Hz is invalid")]
    VideoMode {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Refresh rate.
        refresh_hz: u32,
    },

    /// The framebuffer window is larger than the guest address space.
    #[error("framebuffer of {0:#x} bytes does not fit in the 4 GiB address space")]
    FrameSize(u64),

    /// The dump range is reversed.
    #[error("dump range {begin:#010x}..{end:#010x} is reversed")]
    DumpRange {
        /// First byte.
        begin: u32,
        /// One past the last byte.
        end: u32,
    },

    /// The configuration file could not be read.
    #[error("unable to read config file {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Host error.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for [`crate::config::Config`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures inside the presentation collaborator. Never fatal to the simulation.
#[derive(Debug, Error)]
pub enum PresentationError {
    /// The framebuffer window lies (partly) outside RAM.
    #[error("framebuffer unavailable: {0}")]
    Framebuffer(#[from] MemoryError),

    /// The display backend failed.
    #[error("display failure: {0}")]
    Backend(String),

    /// Writing a snapshot failed.
    #[error("snapshot failed: {0}")]
    Io(#[from] io::Error),
}

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Program image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Memory could not be created or accessed.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// Host I/O failure (trace file, thread spawn, dump file).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
