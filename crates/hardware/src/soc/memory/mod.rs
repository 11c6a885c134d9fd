//! System Memory (RAM).
//!
//! This module implements the flat, byte-addressable RAM shared by every simulation thread.
//! It provides:
//! 1. **Buffer:** Backing storage ([`RamBuffer`]) of relaxed atomic words.
//! 2. **Memory:** A cloneable handle with bounds-checked sized and bulk accesses.
//!
//! # Consistency
//!
//! Memory performs no locking. An aligned 32-bit access is a single relaxed atomic word access.
//! Narrower stores update their word with a compare-and-swap loop so that concurrent stores to
//! neighbouring bytes are never lost. Unaligned multi-byte accesses are composed from their
//! byte accesses and may tear when another thread writes the same bytes concurrently.

/// RAM buffer implementation (mmap or heap) of atomic words.
pub mod buffer;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use self::buffer::{RamBuffer, WORD_BYTES};
use crate::common::constants::MAX_RAM_SIZE;
use crate::common::data::AccessType;
use crate::common::error::{MemoryError, SimError};

/// Memory ordering used for every guest access.
const ORDER: Ordering = Ordering::Relaxed;

/// Chunk size used when streaming a range into a writer.
const DUMP_CHUNK: u64 = 64 * 1024;

/// Shared handle to system RAM.
///
/// Cloning the handle shares the same bytes.
#[derive(Clone)]
pub struct Memory {
    buffer: Arc<RamBuffer>,
    capacity: u64,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Memory {
    /// Allocates zero-filled RAM of `capacity` bytes.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Size in bytes, in `1..=2^32`.
    ///
    /// # Returns
    ///
    /// The memory handle, `InvalidSize` for an out-of-range capacity, or `Allocation` if the
    /// host refused the backing storage.
    pub fn new(capacity: u64) -> Result<Self, MemoryError> {
        if capacity == 0 || capacity > MAX_RAM_SIZE {
            return Err(MemoryError::InvalidSize(capacity));
        }
        let buffer = RamBuffer::new(capacity).map_err(|source| MemoryError::Allocation {
            size: capacity,
            source,
        })?;
        Ok(Self {
            buffer: Arc::new(buffer),
            capacity,
        })
    }

    /// Size of the memory in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Verifies that `[addr, addr + width)` lies inside the memory.
    #[inline(always)]
    pub fn check(&self, addr: u64, width: u64, access: AccessType) -> Result<(), MemoryError> {
        match addr.checked_add(width) {
            Some(end) if end <= self.capacity => Ok(()),
            _ => Err(MemoryError::OutOfBounds {
                addr,
                width,
                capacity: self.capacity,
                access,
            }),
        }
    }

    #[inline(always)]
    fn word(&self, addr: u64) -> &AtomicU32 {
        &self.buffer.words()[(addr / WORD_BYTES) as usize]
    }

    #[inline(always)]
    fn byte_shift(addr: u64) -> u32 {
        ((addr % WORD_BYTES) * 8) as u32
    }

    // ── Unchecked primitives (callers verify the range) ──────

    #[inline(always)]
    fn get8(&self, addr: u64) -> u8 {
        (self.word(addr).load(ORDER) >> Self::byte_shift(addr)) as u8
    }

    #[inline(always)]
    fn put8(&self, addr: u64, val: u8) {
        let shift = Self::byte_shift(addr);
        let mask = 0xFFu32 << shift;
        let bits = u32::from(val) << shift;
        let _ = self
            .word(addr)
            .fetch_update(ORDER, ORDER, |w| Some((w & !mask) | bits));
    }

    #[inline(always)]
    fn get16(&self, addr: u64) -> u16 {
        if addr % WORD_BYTES <= 2 {
            (self.word(addr).load(ORDER) >> Self::byte_shift(addr)) as u16
        } else {
            u16::from_le_bytes([self.get8(addr), self.get8(addr + 1)])
        }
    }

    #[inline(always)]
    fn put16(&self, addr: u64, val: u16) {
        if addr % WORD_BYTES <= 2 {
            let shift = Self::byte_shift(addr);
            let mask = 0xFFFFu32 << shift;
            let bits = u32::from(val) << shift;
            let _ = self
                .word(addr)
                .fetch_update(ORDER, ORDER, |w| Some((w & !mask) | bits));
        } else {
            let [lo, hi] = val.to_le_bytes();
            self.put8(addr, lo);
            self.put8(addr + 1, hi);
        }
    }

    #[inline(always)]
    fn get32(&self, addr: u64) -> u32 {
        if addr % WORD_BYTES == 0 {
            self.word(addr).load(ORDER)
        } else {
            u32::from_le_bytes([
                self.get8(addr),
                self.get8(addr + 1),
                self.get8(addr + 2),
                self.get8(addr + 3),
            ])
        }
    }

    #[inline(always)]
    fn put32(&self, addr: u64, val: u32) {
        if addr % WORD_BYTES == 0 {
            self.word(addr).store(val, ORDER);
        } else {
            for (i, b) in val.to_le_bytes().into_iter().enumerate() {
                self.put8(addr + i as u64, b);
            }
        }
    }

    // ── Sized guest accesses ─────────────────────────────────

    /// Fetches the instruction word at `addr`.
    #[inline]
    pub fn fetch32(&self, addr: u32) -> Result<u32, MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 4, AccessType::Fetch)?;
        Ok(self.get32(addr))
    }

    /// Loads a byte.
    #[inline]
    pub fn load8(&self, addr: u32) -> Result<u8, MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 1, AccessType::Read)?;
        Ok(self.get8(addr))
    }

    /// Loads a little-endian half-word.
    #[inline]
    pub fn load16(&self, addr: u32) -> Result<u16, MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 2, AccessType::Read)?;
        Ok(self.get16(addr))
    }

    /// Loads a little-endian word.
    #[inline]
    pub fn load32(&self, addr: u32) -> Result<u32, MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 4, AccessType::Read)?;
        Ok(self.get32(addr))
    }

    /// Loads a byte and sign-extends it to 32 bits.
    #[inline]
    pub fn load8_signed(&self, addr: u32) -> Result<u32, MemoryError> {
        self.load8(addr).map(|v| v as i8 as i32 as u32)
    }

    /// Loads a half-word and sign-extends it to 32 bits.
    #[inline]
    pub fn load16_signed(&self, addr: u32) -> Result<u32, MemoryError> {
        self.load16(addr).map(|v| v as i16 as i32 as u32)
    }

    /// Stores a byte.
    #[inline]
    pub fn store8(&self, addr: u32, val: u8) -> Result<(), MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 1, AccessType::Write)?;
        self.put8(addr, val);
        Ok(())
    }

    /// Stores a little-endian half-word.
    #[inline]
    pub fn store16(&self, addr: u32, val: u16) -> Result<(), MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 2, AccessType::Write)?;
        self.put16(addr, val);
        Ok(())
    }

    /// Stores a little-endian word.
    #[inline]
    pub fn store32(&self, addr: u32, val: u32) -> Result<(), MemoryError> {
        let addr = u64::from(addr);
        self.check(addr, 4, AccessType::Write)?;
        self.put32(addr, val);
        Ok(())
    }

    // ── Bulk accesses ────────────────────────────────────────

    /// Copies `data` into memory starting at `addr`.
    ///
    /// The whole range is checked first; on error nothing is written.
    pub fn write_bytes(&self, addr: u64, data: &[u8]) -> Result<(), MemoryError> {
        self.check(addr, data.len() as u64, AccessType::Write)?;
        let mut cur = addr;
        let mut rest = data;
        while !rest.is_empty() {
            if cur % WORD_BYTES == 0 && rest.len() >= 4 {
                let (head, tail) = rest.split_at(4);
                self.put32(cur, u32::from_le_bytes([head[0], head[1], head[2], head[3]]));
                rest = tail;
                cur += 4;
            } else {
                self.put8(cur, rest[0]);
                rest = &rest[1..];
                cur += 1;
            }
        }
        Ok(())
    }

    /// Copies `len` bytes starting at `addr` out of memory.
    pub fn read_bytes(&self, addr: u64, len: u64) -> Result<Vec<u8>, MemoryError> {
        self.check(addr, len, AccessType::Read)?;
        let mut out = Vec::with_capacity(len as usize);
        self.copy_out(addr, len, &mut out);
        Ok(out)
    }

    /// Streams `len` bytes starting at `addr` into `sink`.
    ///
    /// # Returns
    ///
    /// The number of bytes written, or the range / host error.
    pub fn read_into<W: Write>(&self, addr: u64, len: u64, sink: &mut W) -> Result<u64, SimError> {
        self.check(addr, len, AccessType::Read)?;
        let mut chunk = Vec::with_capacity(DUMP_CHUNK.min(len) as usize);
        let mut cur = addr;
        let end = addr + len;
        while cur < end {
            let n = DUMP_CHUNK.min(end - cur);
            chunk.clear();
            self.copy_out(cur, n, &mut chunk);
            sink.write_all(&chunk)?;
            cur += n;
        }
        sink.flush()?;
        Ok(len)
    }

    fn copy_out(&self, addr: u64, len: u64, out: &mut Vec<u8>) {
        let end = addr + len;
        let mut cur = addr;
        while cur < end {
            if cur % WORD_BYTES == 0 && end - cur >= 4 {
                out.extend_from_slice(&self.get32(cur).to_le_bytes());
                cur += 4;
            } else {
                out.push(self.get8(cur));
                cur += 1;
            }
        }
    }
}
