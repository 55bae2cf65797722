//! OS memory flag vocabularies
//!
//! Protection, allocation and page-type flags use the Windows numeric
//! values on every platform. They are carried verbatim in
//! [`RegionInfo`](crate::core::types::RegionInfo); the Linux backend
//! translates `/proc/<pid>/maps` permissions into the same values.

// Page protection
pub const PAGE_NOACCESS: u32 = 0x01;
pub const PAGE_READONLY: u32 = 0x02;
pub const PAGE_READWRITE: u32 = 0x04;
pub const PAGE_WRITECOPY: u32 = 0x08;
pub const PAGE_EXECUTE: u32 = 0x10;
pub const PAGE_EXECUTE_READ: u32 = 0x20;
pub const PAGE_EXECUTE_READWRITE: u32 = 0x40;
pub const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;
pub const PAGE_GUARD: u32 = 0x100;
pub const PAGE_NOCACHE: u32 = 0x200;
pub const PAGE_WRITECOMBINE: u32 = 0x400;
pub const PAGE_ENCLAVE_UNVALIDATED: u32 = 0x2000_0000;
pub const PAGE_TARGETS_NO_UPDATE: u32 = 0x4000_0000;
pub const PAGE_TARGETS_INVALID: u32 = 0x4000_0000;
pub const PAGE_ENCLAVE_THREAD_CONTROL: u32 = 0x8000_0000;

// Allocation state
pub const MEM_COMMIT: u32 = 0x0000_1000;
pub const MEM_RESERVE: u32 = 0x0000_2000;
pub const MEM_FREE: u32 = 0x0001_0000;
pub const MEM_RESET: u32 = 0x0008_0000;
pub const MEM_TOP_DOWN: u32 = 0x0010_0000;
pub const MEM_PHYSICAL: u32 = 0x0040_0000;
pub const MEM_RESET_UNDO: u32 = 0x0100_0000;
pub const MEM_LARGE_PAGES: u32 = 0x2000_0000;

// Page type
pub const MEM_PRIVATE: u32 = 0x0002_0000;
pub const MEM_MAPPED: u32 = 0x0004_0000;
pub const MEM_IMAGE: u32 = 0x0100_0000;

/// Any protection that permits reading
pub const READABLE_MASK: u32 = PAGE_READONLY
    | PAGE_READWRITE
    | PAGE_WRITECOPY
    | PAGE_EXECUTE_READ
    | PAGE_EXECUTE_READWRITE
    | PAGE_EXECUTE_WRITECOPY;

/// Any protection that permits writing
pub const WRITABLE_MASK: u32 =
    PAGE_READWRITE | PAGE_WRITECOPY | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;

/// Any protection that permits execution
pub const EXECUTABLE_MASK: u32 =
    PAGE_EXECUTE | PAGE_EXECUTE_READ | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;

/// Builds a protection value from read/write/execute bits
pub const fn protection_from_rwx(read: bool, write: bool, execute: bool) -> u32 {
    match (read, write, execute) {
        (_, true, true) => PAGE_EXECUTE_READWRITE,
        (true, false, true) => PAGE_EXECUTE_READ,
        (false, false, true) => PAGE_EXECUTE,
        (_, true, false) => PAGE_READWRITE,
        (true, false, false) => PAGE_READONLY,
        (false, false, false) => PAGE_NOACCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_from_rwx() {
        assert_eq!(protection_from_rwx(true, false, false), PAGE_READONLY);
        assert_eq!(protection_from_rwx(true, true, false), PAGE_READWRITE);
        assert_eq!(protection_from_rwx(true, false, true), PAGE_EXECUTE_READ);
        assert_eq!(protection_from_rwx(true, true, true), PAGE_EXECUTE_READWRITE);
        assert_eq!(protection_from_rwx(false, false, false), PAGE_NOACCESS);
    }

    #[test]
    fn test_masks() {
        assert_ne!(READABLE_MASK & PAGE_EXECUTE_READ, 0);
        assert_eq!(READABLE_MASK & PAGE_EXECUTE, 0);
        assert_eq!(WRITABLE_MASK & PAGE_READONLY, 0);
        assert_ne!(EXECUTABLE_MASK & PAGE_EXECUTE, 0);
    }
}
