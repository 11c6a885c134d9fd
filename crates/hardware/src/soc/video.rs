//! Framebuffer Window Rasterizer.
//!
//! Converts the guest framebuffer at a fixed RAM window into a packed RGBA8 image. The
//! framebuffer is read while the CPU may be writing it, so a frame can mix old and new pixels.
//!
//! Supported depths:
//! - 8 bpp: grayscale, one byte per pixel
//! - 16 bpp: RGB565, little-endian
//! - 32 bpp: RGBA in memory byte order

use crate::common::error::MemoryError;
use crate::config::VideoConfig;
use crate::soc::memory::Memory;

/// Bytes per output pixel.
pub const RGBA_BYTES: usize = 4;

/// Geometry of the guest framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    /// Base address in RAM.
    pub addr: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per pixel (8, 16 or 32).
    pub depth: u32,
}

impl From<&VideoConfig> for Framebuffer {
    fn from(cfg: &VideoConfig) -> Self {
        Self {
            addr: cfg.addr,
            width: cfg.width,
            height: cfg.height,
            depth: cfg.depth,
        }
    }
}

impl Framebuffer {
    /// Number of pixels.
    pub fn pixels(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Size of the guest window in bytes.
    pub fn window_bytes(&self) -> u64 {
        u64::from(self.width)
            .saturating_mul(u64::from(self.height))
            .saturating_mul(u64::from(self.depth / 8))
    }

    /// Samples the window and writes `width * height` RGBA pixels into `out`.
    ///
    /// `out` is cleared first; on error it is left empty.
    pub fn rasterize(&self, memory: &Memory, out: &mut Vec<u8>) -> Result<(), MemoryError> {
        out.clear();
        let raw = memory.read_bytes(u64::from(self.addr), self.window_bytes())?;
        out.reserve(self.pixels().saturating_mul(RGBA_BYTES));
        match self.depth {
            8 => {
                for &y in &raw {
                    out.extend_from_slice(&[y, y, y, 0xFF]);
                }
            }
            16 => {
                for px in raw.chunks_exact(2) {
                    out.extend_from_slice(&rgb565_to_rgba(u16::from_le_bytes([px[0], px[1]])));
                }
            }
            _ => out.extend_from_slice(&raw),
        }
        Ok(())
    }
}

/// Expands an RGB565 pixel to RGBA8, replicating the high bits into the low bits.
pub fn rgb565_to_rgba(px: u16) -> [u8; RGBA_BYTES] {
    let r = ((px >> 11) & 0x1F) as u8;
    let g = ((px >> 5) & 0x3F) as u8;
    let b = (px & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 0xFF]
}
