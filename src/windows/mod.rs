//! Windows API layer for process and memory access
//!
//! Provides safe wrappers around Windows API functions for process
//! and memory operations. All unsafe FFI calls are contained within
//! this module with proper error handling and validation.

pub mod bindings;
pub mod types;
pub mod utils;

mod process;

pub use process::{enumerate_processes, RawProcess};
pub use types::Handle;
pub use utils::ErrorCode;
