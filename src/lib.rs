//! procmem: cross-process memory access and signature scanning
//!
//! Enumerate processes, open a target, list its modules and regions, read
//! and write typed values, and locate byte signatures in module images.
//! [`MemoryEngine`] wraps the whole surface with the loaded configuration;
//! [`MemoryEngine::deferred`] runs the same operations off the caller's
//! thread.

pub mod config;
pub mod core;
pub mod dispatch;
pub mod engine;
pub mod memory;
pub mod process;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(windows)]
pub mod windows;

// Re-export main types from core module
pub use crate::core::types::{
    Address, MemoryError, MemoryResult, MemoryValue, ModuleInfo, ProcessId, ProcessInfo,
    RegionInfo, ValueType, Vector3, Vector4,
};
pub use crate::core::{AUTHORS, VERSION};

pub use config::Config;
pub use dispatch::{dispatch, dispatch_with_callback, Completion};
pub use engine::{DeferredEngine, MemoryEngine};
pub use memory::{Pattern, ScanDirective, ScanMode};
pub use process::{ProcessAccess, ProcessHandle, TargetProcess};
