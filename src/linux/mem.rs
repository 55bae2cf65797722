//! Positional access to /proc/<pid>/mem

use super::maps::{modules_from_maps, read_maps, regions_from_maps};
use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, RegionInfo};
use crate::process::ProcessAccess;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

/// An open `/proc/<pid>/mem` file
///
/// The kernel checks ptrace access when the file is opened, so a denied
/// target fails in `open` rather than on the first read.
pub struct RawProcess {
    pid: ProcessId,
    mem: File,
    writable: bool,
}

impl RawProcess {
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        if pid == 0 || !Path::new(&format!("/proc/{}", pid)).exists() {
            return Err(MemoryError::ProcessNotFound(format!("PID: {}", pid)));
        }

        let writable = access.contains(ProcessAccess::VM_WRITE);
        let mem = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(format!("/proc/{}/mem", pid))
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("PID: {}", pid)),
                _ => MemoryError::access_denied(pid, e.to_string()),
            })?;

        Ok(RawProcess { pid, mem, writable })
    }

    pub fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        self.mem
            .read_exact_at(buffer, address.as_u64())
            .map_err(|e| MemoryError::read_failed(address, describe(&e, buffer.len())))
    }

    pub fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if !self.writable {
            return Err(MemoryError::write_failed(
                address,
                "handle was opened without write access",
            ));
        }
        self.mem
            .write_all_at(data, address.as_u64())
            .map_err(|e| MemoryError::write_failed(address, describe(&e, data.len())))
    }

    pub fn modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
        Ok(modules_from_maps(&read_maps(self.pid)?))
    }

    pub fn regions(&self) -> MemoryResult<Vec<RegionInfo>> {
        Ok(regions_from_maps(&read_maps(self.pid)?))
    }
}

fn describe(error: &io::Error, len: usize) -> String {
    match error.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::WriteZero => {
            format!("partial transfer of {} bytes", len)
        }
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_read_own_memory() {
        let process = RawProcess::open(std::process::id(), ProcessAccess::READ).unwrap();
        let value: u64 = 0x1122_3344_5566_7788;
        let mut buffer = [0u8; 8];
        process
            .read(Address::new(&value as *const u64 as usize), &mut buffer)
            .unwrap();
        assert_eq!(u64::from_ne_bytes(buffer), value);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_unmapped_read_fails() {
        let process = RawProcess::open(std::process::id(), ProcessAccess::READ).unwrap();
        let mut buffer = [0u8; 8];
        let result = process.read(Address::new(0x10), &mut buffer);
        assert!(matches!(result, Err(MemoryError::ReadFailed { .. })));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_write_requires_write_access() {
        let process = RawProcess::open(std::process::id(), ProcessAccess::READ).unwrap();
        let value = 0u32;
        let result = process.write(Address::new(&value as *const u32 as usize), &[1, 2, 3, 4]);
        assert!(matches!(result, Err(MemoryError::WriteFailed { .. })));
    }

    #[test]
    fn test_missing_process() {
        assert!(matches!(
            RawProcess::open(0, ProcessAccess::READ),
            Err(MemoryError::ProcessNotFound(_))
        ));
        assert!(matches!(
            RawProcess::open(u32::MAX, ProcessAccess::READ),
            Err(MemoryError::ProcessNotFound(_))
        ));
    }
}
