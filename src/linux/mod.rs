//! Linux procfs backend
//!
//! Processes come from `/proc`, modules and regions from
//! `/proc/<pid>/maps`, and memory access goes through positional I/O on
//! `/proc/<pid>/mem`.

pub mod maps;
mod mem;
pub mod procfs;

pub use mem::RawProcess;
pub use procfs::enumerate_processes;
