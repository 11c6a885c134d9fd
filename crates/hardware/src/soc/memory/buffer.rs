//! RAM Buffer Implementation.
//!
//! This module provides the backing storage for system RAM as a slice of 32-bit atomic words.
//! It supports lazy allocation via `mmap` on Unix systems so that a 4 GiB address space
//! only commits the pages a program actually touches. Every word is an `AtomicU32`, which
//! lets the CPU thread and the presentation thread share the buffer without a lock.

use std::io;
use std::sync::atomic::AtomicU32;

/// Number of bytes per storage word.
pub const WORD_BYTES: u64 = 4;

/// Backing storage of a [`RamBuffer`].
enum Backing {
    /// Anonymous private mapping; unmapped on drop.
    #[cfg(unix)]
    Mmap { ptr: *mut AtomicU32, len: usize },

    /// Heap-allocated words.
    #[cfg(not(unix))]
    Heap(Box<[AtomicU32]>),
}

/// Zero-initialised RAM storage addressed as 32-bit words.
///
/// On Unix systems this uses `mmap` with `MAP_NORESERVE`, which allows for lazy allocation
/// (pages are only allocated by the OS when accessed).
pub struct RamBuffer {
    backing: Backing,
    words: usize,
}

// SAFETY: the mapping is owned exclusively by this buffer and only ever accessed through
// `AtomicU32`, which is itself `Send + Sync`.
unsafe impl Send for RamBuffer {}
// SAFETY: see above; all shared access goes through atomic operations.
unsafe impl Sync for RamBuffer {}

impl RamBuffer {
    /// Allocates a buffer holding at least `bytes` bytes, rounded up to whole words.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Requested size in bytes (non-zero).
    ///
    /// # Returns
    ///
    /// The buffer, or the host error if the allocation was refused.
    pub fn new(bytes: u64) -> io::Result<Self> {
        let words = usize::try_from(bytes.div_ceil(WORD_BYTES))
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "size exceeds host address space"))?;
        let len = words
            .checked_mul(size_of::<AtomicU32>())
            .ok_or_else(|| io::Error::new(io::ErrorKind::OutOfMemory, "size overflow"))?;

        #[cfg(unix)]
        {
            // SAFETY: requesting a fresh anonymous mapping; no existing memory is affected.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }
            Ok(Self {
                backing: Backing::Mmap {
                    ptr: ptr.cast::<AtomicU32>(),
                    len,
                },
                words,
            })
        }

        #[cfg(not(unix))]
        {
            let _ = len;
            let mut storage = Vec::new();
            storage
                .try_reserve_exact(words)
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            storage.extend((0..words).map(|_| AtomicU32::new(0)));
            Ok(Self {
                backing: Backing::Heap(storage.into_boxed_slice()),
                words,
            })
        }
    }

    /// Returns the storage words.
    #[inline(always)]
    pub fn words(&self) -> &[AtomicU32] {
        match &self.backing {
            #[cfg(unix)]
            // SAFETY: `ptr` points to `words` zero-initialised, suitably aligned (page-aligned)
            // `AtomicU32`s that live until `drop` unmaps them. All-zero bits are a valid
            // `AtomicU32`.
            Backing::Mmap { ptr, .. } => unsafe { std::slice::from_raw_parts(*ptr, self.words) },
            #[cfg(not(unix))]
            Backing::Heap(storage) => storage,
        }
    }
}

impl Drop for RamBuffer {
    /// Unmaps the mapped memory on Unix; heap storage drops normally.
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let Backing::Mmap { ptr, len } = self.backing;
            // SAFETY: `ptr`/`len` describe the mapping created in `new`, and no borrow of it
            // can outlive `self`.
            let _ = unsafe { libc::munmap(ptr.cast(), len) };
        }
    }
}
