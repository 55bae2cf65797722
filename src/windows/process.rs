//! Windows process backend

use super::bindings::{kernel32, toolhelp};
use super::types::Handle;
use crate::core::types::{Address, MemoryResult, ModuleInfo, ProcessId, ProcessInfo, RegionInfo};
use crate::process::ProcessAccess;

/// An open Windows process handle
pub struct RawProcess {
    pid: ProcessId,
    handle: Handle,
}

impl RawProcess {
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let handle = kernel32::open_process(pid, access.value())?;
        Ok(RawProcess { pid, handle })
    }

    pub fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        kernel32::read_process_memory(&self.handle, address, buffer)
    }

    pub fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        kernel32::write_process_memory(&self.handle, address, data)
    }

    pub fn modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
        toolhelp::module_snapshot(self.pid)
    }

    /// Walks the address space with VirtualQueryEx
    pub fn regions(&self) -> MemoryResult<Vec<RegionInfo>> {
        let mut regions = Vec::new();
        let mut address = Address::null();

        while let Some(mbi) = kernel32::virtual_query_ex(&self.handle, address) {
            let region = RegionInfo::from(mbi);
            let next = match region.base_address.checked_add(region.size) {
                Some(next) if region.size > 0 && next > address => next,
                _ => break,
            };
            regions.push(region);
            address = next;
        }

        Ok(regions)
    }
}

pub fn enumerate_processes() -> MemoryResult<Vec<ProcessInfo>> {
    toolhelp::process_snapshot()
}
