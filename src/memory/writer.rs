//! Typed memory writing

use crate::config::MemoryConfig;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue};
use crate::process::TargetProcess;
use tracing::debug;

/// Writes raw and typed values into a target
///
/// Page protection is never adjusted; writing to a read-only page fails
/// with `WriteFailed`.
pub struct MemoryWriter<'a, P: TargetProcess + ?Sized> {
    process: &'a P,
    max_write_size: usize,
}

impl<'a, P: TargetProcess + ?Sized> MemoryWriter<'a, P> {
    /// Create a new memory writer
    pub fn new(process: &'a P, limits: &MemoryConfig) -> Self {
        MemoryWriter {
            process,
            max_write_size: limits.max_read_size,
        }
    }

    /// Write raw bytes to memory
    pub fn write_bytes(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if address.is_null() {
            return Err(MemoryError::invalid_argument("address must be non-zero"));
        }
        if data.is_empty() {
            return Err(MemoryError::invalid_argument("nothing to write"));
        }
        if data.len() > self.max_write_size {
            return Err(MemoryError::invalid_argument(format!(
                "write size {} exceeds maximum {}",
                data.len(),
                self.max_write_size
            )));
        }

        debug!(%address, len = data.len(), pid = self.process.pid(), "Writing memory");
        self.process.write_memory(address, data)
    }

    /// Write a typed value in native byte order
    pub fn write_value(&self, address: Address, value: &MemoryValue) -> MemoryResult<()> {
        self.write_bytes(address, &value.to_bytes())
    }
}
