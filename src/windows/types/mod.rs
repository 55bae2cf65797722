//! Windows-specific type wrappers

pub mod handle;
pub mod memory_info;

pub use handle::Handle;
