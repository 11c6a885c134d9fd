//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components that make up the simulated machine: the shared RAM,
//! the MMIO constants window written at startup and the framebuffer window read by the
//! presentation loop.

/// Shared, bounds-checked system RAM.
pub mod memory;

/// Read-only machine constants and the frame counter.
pub mod mmio;

/// Framebuffer window rasterizer.
pub mod video;

pub use memory::Memory;
