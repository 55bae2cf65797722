//! Abstraction over an opened target process

use crate::core::types::{Address, MemoryResult, ModuleInfo, ProcessId, RegionInfo};

/// The operations the memory accessor and scanner need from a target
///
/// [`ProcessHandle`](super::ProcessHandle) is the OS-backed implementation.
/// Reads must fill the whole buffer or fail; there are no partial reads.
pub trait TargetProcess: Send + Sync {
    fn pid(&self) -> ProcessId;

    /// Reads exactly `buffer.len()` bytes starting at `address`
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()>;

    /// Writes all of `data` starting at `address`
    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()>;

    /// Loaded modules in OS order, main image first
    fn modules(&self) -> MemoryResult<Vec<ModuleInfo>>;

    /// Memory regions in ascending address order
    fn regions(&self) -> MemoryResult<Vec<RegionInfo>>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::core::types::MemoryError;
    use crate::memory::flags::{MEM_COMMIT, MEM_IMAGE, PAGE_EXECUTE_READ};
    use std::ops::Range;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    /// Buffer-backed target with one module covering the whole buffer
    pub struct MockTarget {
        pub base: Address,
        memory: RwLock<Vec<u8>>,
        unreadable: Vec<Range<usize>>,
        modules: Vec<ModuleInfo>,
        reads: AtomicUsize,
    }

    impl MockTarget {
        pub fn new(base: usize, bytes: Vec<u8>) -> Self {
            let module = ModuleInfo::new("target.exe", Address::new(base), bytes.len());
            MockTarget {
                base: Address::new(base),
                memory: RwLock::new(bytes),
                unreadable: Vec::new(),
                modules: vec![module],
                reads: AtomicUsize::new(0),
            }
        }

        /// Marks a range of buffer offsets as faulting
        pub fn with_unreadable(mut self, range: Range<usize>) -> Self {
            self.unreadable.push(range);
            self
        }

        pub fn with_module(mut self, module: ModuleInfo) -> Self {
            self.modules.push(module);
            self
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn bytes(&self) -> Vec<u8> {
            self.memory.read().unwrap().clone()
        }

        fn offset_range(&self, address: Address, len: usize) -> Option<Range<usize>> {
            let start = address.as_usize().checked_sub(self.base.as_usize())?;
            let end = start.checked_add(len)?;
            Some(start..end)
        }
    }

    impl TargetProcess for MockTarget {
        fn pid(&self) -> ProcessId {
            4242
        }

        fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let memory = self.memory.read().unwrap();
            let range = self
                .offset_range(address, buffer.len())
                .filter(|r| r.end <= memory.len())
                .filter(|r| !self.unreadable.iter().any(|u| u.start < r.end && r.start < u.end))
                .ok_or_else(|| MemoryError::read_failed(address, "unmapped"))?;
            buffer.copy_from_slice(&memory[range]);
            Ok(())
        }

        fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
            let mut memory = self.memory.write().unwrap();
            let range = self
                .offset_range(address, data.len())
                .filter(|r| r.end <= memory.len())
                .ok_or_else(|| MemoryError::write_failed(address, "unmapped"))?;
            memory[range].copy_from_slice(data);
            Ok(())
        }

        fn modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
            Ok(self.modules.clone())
        }

        fn regions(&self) -> MemoryResult<Vec<RegionInfo>> {
            Ok(vec![RegionInfo {
                base_address: self.base,
                size: self.memory.read().unwrap().len(),
                protection: PAGE_EXECUTE_READ,
                state: MEM_COMMIT,
                region_type: MEM_IMAGE,
            }])
        }
    }
}
