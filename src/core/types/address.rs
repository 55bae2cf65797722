//! Virtual address wrapper type with hex parsing and checked arithmetic

use super::error::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A virtual address inside the target process
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: usize) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Aligns the address down to the specified power-of-two boundary
    pub const fn align_down(&self, alignment: usize) -> Self {
        if alignment == 0 {
            return *self;
        }
        Address(self.0 & !(alignment - 1))
    }

    /// Bytes remaining until the next `alignment` boundary (never zero)
    pub const fn distance_to_boundary(&self, alignment: usize) -> usize {
        if alignment == 0 {
            return usize::MAX;
        }
        alignment - (self.0 % alignment)
    }

    /// Adds a byte count, returning `None` on overflow
    pub const fn checked_add(&self, bytes: usize) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Subtracts a byte count, returning `None` on underflow
    pub const fn checked_sub(&self, bytes: usize) -> Option<Self> {
        match self.0.checked_sub(bytes) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Adds a byte count, reporting overflow as `InvalidArgument`
    pub fn add(&self, bytes: usize) -> MemoryResult<Self> {
        self.checked_add(bytes).ok_or_else(|| {
            MemoryError::invalid_argument(format!("{} + 0x{:X} overflows", self, bytes))
        })
    }

    /// Subtracts a byte count, reporting underflow as `InvalidArgument`
    pub fn sub(&self, bytes: usize) -> MemoryResult<Self> {
        self.checked_sub(bytes).ok_or_else(|| {
            MemoryError::invalid_argument(format!("{} - 0x{:X} underflows", self, bytes))
        })
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Returns the address as a file offset (procfs `mem` files)
    pub const fn as_u64(&self) -> u64 {
        self.0 as u64
    }
}

impl FromStr for Address {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Handle hex prefix variations
        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            usize::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            usize::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            // Assume hex if contains letters
            usize::from_str_radix(s, 16)
        } else {
            s.parse::<usize>()
        };

        value
            .map(Address::new)
            .map_err(|_| MemoryError::InvalidArgument(format!("invalid address '{}'", s)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

impl From<Address> for usize {
    fn from(address: Address) -> Self {
        address.0
    }
}
