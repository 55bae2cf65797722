//! Core type definitions for procmem
//!
//! This module contains all fundamental types used throughout the engine,
//! including address wrappers, typed memory values, process and module
//! descriptors, memory regions, and error types.

mod address;
mod error;
mod process_info;
mod region_info;
mod value;

// Re-export all public types
pub use address::Address;
pub use error::{MemoryError, MemoryResult};
pub use process_info::{os_names_equal, ModuleInfo, ProcessInfo};
pub use region_info::RegionInfo;
pub use value::{MemoryValue, ValueType, Vector3, Vector4};

// Common type aliases
pub type ProcessId = u32;
