//! Typed memory reading

use crate::config::MemoryConfig;
use crate::core::types::{Address, MemoryError, MemoryResult, MemoryValue, ValueType};
use crate::process::TargetProcess;
use std::mem;
use tracing::trace;

/// String reads never cross a page in one request
pub const PAGE_SIZE: usize = 4096;

/// Largest single request made while looking for a string terminator
pub const STRING_STEP: usize = 256;

/// Reads raw and typed values from a target
pub struct MemoryReader<'a, P: TargetProcess + ?Sized> {
    process: &'a P,
    max_read_size: usize,
    max_string_length: usize,
}

impl<'a, P: TargetProcess + ?Sized> MemoryReader<'a, P> {
    /// Create a new reader with the given limits
    pub fn new(process: &'a P, limits: &MemoryConfig) -> Self {
        MemoryReader {
            process,
            max_read_size: limits.max_read_size,
            max_string_length: limits.max_string_length,
        }
    }

    /// Read raw bytes from memory
    ///
    /// `size` must be in `1..=max_read_size`.
    pub fn read_bytes(&self, address: Address, size: usize) -> MemoryResult<Vec<u8>> {
        check_address(address)?;
        if size == 0 {
            return Err(MemoryError::invalid_argument("read size must be > 0"));
        }
        if size > self.max_read_size {
            return Err(MemoryError::invalid_argument(format!(
                "read size {} exceeds maximum {}",
                size, self.max_read_size
            )));
        }

        let mut buffer = vec![0u8; size];
        self.process.read_memory(address, &mut buffer)?;
        Ok(buffer)
    }

    /// Read a value of the given type
    ///
    /// `bytes` has no implied length; use [`read_bytes`](Self::read_bytes).
    pub fn read_value(&self, address: Address, value_type: ValueType) -> MemoryResult<MemoryValue> {
        check_address(address)?;
        trace!(%address, %value_type, "Reading value");

        let size = match value_type {
            ValueType::String => return self.read_string(address).map(MemoryValue::String),
            ValueType::Bytes => {
                return Err(MemoryError::invalid_argument(
                    "bytes reads need an explicit length",
                ))
            }
            fixed => fixed.size().unwrap_or(0),
        };

        let mut buffer = vec![0u8; size];
        self.process.read_memory(address, &mut buffer)?;
        MemoryValue::from_bytes(&buffer, value_type)
            .ok_or_else(|| MemoryError::read_failed(address, "short buffer"))
    }

    /// Read a pointer-width value
    pub fn read_pointer(&self, address: Address) -> MemoryResult<Address> {
        check_address(address)?;
        let mut buffer = [0u8; mem::size_of::<usize>()];
        self.process.read_memory(address, &mut buffer)?;
        Ok(Address::new(usize::from_ne_bytes(buffer)))
    }

    /// Read a NUL-terminated string
    ///
    /// Reads at most [`STRING_STEP`] bytes per request and never crosses a
    /// page in one request. When a request fails the same span is retried
    /// byte by byte, so a string that ends right before unreadable memory
    /// is still returned. Fails with `ReadFailed` when no NUL appears within
    /// `max_string_length` bytes or unreadable memory comes first. Invalid
    /// UTF-8 is replaced.
    pub fn read_string(&self, address: Address) -> MemoryResult<String> {
        check_address(address)?;

        let limit = self.max_string_length.saturating_add(1);
        let mut bytes = Vec::new();
        let mut cursor = address;
        let mut piece = [0u8; STRING_STEP];

        while bytes.len() < limit {
            let len = cursor
                .distance_to_boundary(PAGE_SIZE)
                .min(STRING_STEP)
                .min(limit - bytes.len());
            let read = self.read_prefix(cursor, &mut piece[..len])?;
            let data = &piece[..read];

            if let Some(nul) = data.iter().position(|&b| b == 0) {
                bytes.extend_from_slice(&data[..nul]);
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            if read < len {
                return Err(MemoryError::read_failed(
                    cursor.add(read)?,
                    "unreadable memory before string terminator",
                ));
            }
            bytes.extend_from_slice(data);
            cursor = cursor.add(read)?;
        }

        Err(MemoryError::read_failed(
            address,
            format!("no terminator within {} bytes", self.max_string_length),
        ))
    }

    /// Fills as much of `piece` as is readable, stopping after a NUL
    ///
    /// Returns the number of valid bytes. Errors only when the first byte
    /// is unreadable.
    fn read_prefix(&self, at: Address, piece: &mut [u8]) -> MemoryResult<usize> {
        let err = match self.process.read_memory(at, piece) {
            Ok(()) => return Ok(piece.len()),
            Err(e) if piece.len() == 1 => return Err(e),
            Err(e) => e,
        };

        trace!(address = %at, len = piece.len(), "Retrying string read bytewise");
        for i in 0..piece.len() {
            if self.process.read_memory(at.add(i)?, &mut piece[i..=i]).is_err() {
                return if i == 0 { Err(err) } else { Ok(i) };
            }
            if piece[i] == 0 {
                return Ok(i + 1);
            }
        }
        Ok(piece.len())
    }
}

fn check_address(address: Address) -> MemoryResult<()> {
    if address.is_null() {
        Err(MemoryError::invalid_argument("address must be non-zero"))
    } else {
        Ok(())
    }
}
