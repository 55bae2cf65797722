//! Memory region descriptor

use super::Address;
use crate::memory::flags::{
    EXECUTABLE_MASK, MEM_COMMIT, PAGE_GUARD, READABLE_MASK, WRITABLE_MASK,
};
use serde::{Deserialize, Serialize};

/// A contiguous range of the target's address space with uniform attributes
///
/// `protection`, `state` and `region_type` are the OS flag values from
/// [`crate::memory::flags`], passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub base_address: Address,
    pub size: usize,
    pub protection: u32,
    pub state: u32,
    pub region_type: u32,
}

impl RegionInfo {
    pub fn end_address(&self) -> Address {
        Address::new(self.base_address.as_usize().saturating_add(self.size))
    }

    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address && address < self.end_address()
    }

    /// Check if memory is committed
    pub fn is_committed(&self) -> bool {
        self.state == MEM_COMMIT
    }

    /// Check if memory is readable (guard pages are not)
    pub fn is_readable(&self) -> bool {
        self.is_committed()
            && (self.protection & PAGE_GUARD) == 0
            && (self.protection & READABLE_MASK) != 0
    }

    /// Check if memory is writable
    pub fn is_writable(&self) -> bool {
        (self.protection & WRITABLE_MASK) != 0
    }

    pub fn is_executable(&self) -> bool {
        (self.protection & EXECUTABLE_MASK) != 0
    }
}
