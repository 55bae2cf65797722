//! Memory operations: typed reads and writes plus signature scanning
//!
//! - [`MemoryReader`] / [`MemoryWriter`] marshal typed values in native
//!   byte order
//! - [`PatternScanner`] finds [`Pattern`]s in module images with chunked reads
//! - [`flags`] holds the OS protection/allocation/page-type vocabularies

pub mod flags;
pub mod pattern;
pub mod reader;
pub mod scanner;
pub mod writer;

pub use pattern::{Pattern, ScanDirective, ScanMode};
pub use reader::MemoryReader;
pub use scanner::{PatternScanner, ScanOptions};
pub use writer::MemoryWriter;
