//! Shared test fixtures
#![allow(dead_code)]

use procmem::memory::flags::{MEM_COMMIT, MEM_IMAGE, PAGE_READWRITE};
use procmem::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, RegionInfo, TargetProcess};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FAKE_PID: ProcessId = 31337;
pub const IMAGE_BASE: usize = 0x0040_0000;

/// In-memory target: one image module starting at `IMAGE_BASE`
pub struct FakeProcess {
    base: usize,
    memory: Mutex<Vec<u8>>,
    faulting: Vec<Range<usize>>,
    reads: AtomicUsize,
}

impl FakeProcess {
    pub fn new(image: Vec<u8>) -> Self {
        FakeProcess {
            base: IMAGE_BASE,
            memory: Mutex::new(image),
            faulting: Vec::new(),
            reads: AtomicUsize::new(0),
        }
    }

    /// Image offsets in `range` fault on read
    pub fn faulting(mut self, range: Range<usize>) -> Self {
        self.faulting.push(range);
        self
    }

    pub fn address(&self, offset: usize) -> Address {
        Address::new(self.base + offset)
    }

    pub fn len(&self) -> usize {
        self.memory.lock().unwrap().len()
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.memory.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn span(&self, address: Address, len: usize, limit: usize) -> Option<Range<usize>> {
        let start = address.as_usize().checked_sub(self.base)?;
        let end = start.checked_add(len)?;
        (end <= limit).then_some(start..end)
    }
}

impl TargetProcess for FakeProcess {
    fn pid(&self) -> ProcessId {
        FAKE_PID
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let memory = self.memory.lock().unwrap();
        let span = self
            .span(address, buffer.len(), memory.len())
            .filter(|s| !self.faulting.iter().any(|f| f.start < s.end && s.start < f.end))
            .ok_or_else(|| MemoryError::read_failed(address, "page fault"))?;
        buffer.copy_from_slice(&memory[span]);
        Ok(())
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let mut memory = self.memory.lock().unwrap();
        let span = self
            .span(address, data.len(), memory.len())
            .ok_or_else(|| MemoryError::write_failed(address, "page fault"))?;
        memory[span].copy_from_slice(data);
        Ok(())
    }

    fn modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
        Ok(vec![
            ModuleInfo::new("game.exe", Address::new(self.base), self.len()),
            ModuleInfo::new("empty.dll", Address::new(0x7FF0_0000), 0),
        ])
    }

    fn regions(&self) -> MemoryResult<Vec<RegionInfo>> {
        Ok(vec![RegionInfo {
            base_address: Address::new(self.base),
            size: self.len(),
            protection: PAGE_READWRITE,
            state: MEM_COMMIT,
            region_type: MEM_IMAGE,
        }])
    }
}
