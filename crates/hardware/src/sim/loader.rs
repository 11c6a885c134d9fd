//! Binary Loader.
//!
//! This module places a raw program image into RAM before the CPU starts. It performs:
//! 1. **Header parsing:** Without an address override, the first four bytes of the image are
//!    the little-endian start address and the rest is payload.
//! 2. **Override placement:** With an override, the whole image is payload placed at the
//!    override address.
//! 3. **Range checking:** The payload must fit in RAM; nothing is written otherwise.
//!
//! The payload is not validated as instructions.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::common::error::LoadError;
use crate::soc::memory::Memory;

/// Size of the start-address header in bytes.
pub const HEADER_BYTES: usize = 4;

/// A program image placed in RAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    /// Address of the first payload byte; also the CPU entry point.
    pub start_addr: u32,
    /// Number of payload bytes written.
    pub bytes: u64,
}

/// Loads the image file at `path` into `memory`.
///
/// # Arguments
///
/// * `path` - Image file.
/// * `memory` - Destination RAM.
/// * `addr_override` - Load address; when `Some`, the image has no header.
pub fn load_image(
    path: &Path,
    memory: &Memory,
    addr_override: Option<u32>,
) -> Result<LoadedImage, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let image = load_image_bytes(&data, memory, addr_override)?;
    info!(
        "Read {} bytes from {} into RAM @ 0x{:08x}",
        image.bytes,
        path.display(),
        image.start_addr
    );
    Ok(image)
}

/// Loads an in-memory image into `memory`.
pub fn load_image_bytes(
    data: &[u8],
    memory: &Memory,
    addr_override: Option<u32>,
) -> Result<LoadedImage, LoadError> {
    let (start_addr, payload) = match addr_override {
        Some(addr) => (addr, data),
        None => {
            let Some((header, payload)) = data.split_first_chunk::<HEADER_BYTES>() else {
                return Err(LoadError::TruncatedHeader { len: data.len() });
            };
            (u32::from_le_bytes(*header), payload)
        }
    };
    memory.write_bytes(u64::from(start_addr), payload)?;
    Ok(LoadedImage {
        start_addr,
        bytes: payload.len() as u64,
    })
}
