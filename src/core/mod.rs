//! Core module containing fundamental types for procmem
//!
//! This module provides the foundational building blocks used throughout
//! the engine, including address handling, typed memory values,
//! process/module descriptors, and the error taxonomy.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address,
    MemoryError,
    MemoryResult,
    MemoryValue,
    ModuleInfo,
    ProcessInfo,
    RegionInfo,
    ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(any(windows, target_os = "linux")))]
compile_error!("procmem supports Windows and Linux targets only");
