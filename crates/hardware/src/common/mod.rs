//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Architecture sizes, the sentinel return address and exit codes.
//! 2. **Memory Access:** Definitions for categorizing memory operations (Fetch/Read/Write).
//! 3. **Error Handling:** Trap representations and typed subsystem errors.
//! 4. **Register Management:** A unified interface for scalar and vector register access.

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and trap definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use data::AccessType;
pub use error::{ConfigError, LoadError, MemoryError, PresentationError, SimError, Trap};
pub use reg::RegisterFile;
