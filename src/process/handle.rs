//! Safe process handle wrapper with RAII semantics

use super::enumerator::find_process_by_name;
use super::target::TargetProcess;
use crate::core::types::{
    Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, RegionInfo,
};
use std::fmt;
use std::ops::BitOr;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

#[cfg(target_os = "linux")]
use crate::linux::RawProcess;
#[cfg(windows)]
use crate::windows::RawProcess;

/// Access rights for process handles
///
/// Values are the Windows process access masks. The Linux backend only
/// distinguishes whether `VM_WRITE` was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// All possible access rights
    pub const ALL_ACCESS: Self = Self { value: 0x1FFFFF };
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// Write memory access
    pub const VM_WRITE: Self = Self { value: 0x0020 };
    /// Memory operation access, required alongside `VM_WRITE`
    pub const VM_OPERATION: Self = Self { value: 0x0008 };

    /// Query + read, used when no access is specified
    pub const READ: Self = Self::QUERY_INFORMATION.union(Self::VM_READ);
    /// Query + read + write + operation
    pub const READ_WRITE: Self = Self::READ
        .union(Self::VM_WRITE)
        .union(Self::VM_OPERATION);

    pub const fn from_raw(value: u32) -> Self {
        Self { value }
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            value: self.value | other.value,
        }
    }

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        rights.iter().fold(Self::from_raw(0), |acc, r| acc.union(*r))
    }

    /// Whether every right in `other` is also in `self`
    pub const fn contains(&self, other: Self) -> bool {
        self.value & other.value == other.value
    }

    /// Get raw value
    pub const fn value(&self) -> u32 {
        self.value
    }
}

impl Default for ProcessAccess {
    fn default() -> Self {
        Self::READ
    }
}

impl BitOr for ProcessAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Owned OS reference to one target process
///
/// `close` is idempotent and waits for in-flight operations; any
/// operation after it fails with [`MemoryError::InvalidHandle`]. Dropping
/// the handle closes it.
pub struct ProcessHandle {
    pid: ProcessId,
    access: ProcessAccess,
    inner: RwLock<Option<RawProcess>>,
}

impl ProcessHandle {
    /// Open a process with specified access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        debug!(pid, access = %format_args!("0x{:X}", access.value()), "Opening process");
        let raw = RawProcess::open(pid, access)?;
        Ok(ProcessHandle {
            pid,
            access,
            inner: RwLock::new(Some(raw)),
        })
    }

    /// Open a process for reading memory
    pub fn open_for_read(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::READ)
    }

    /// Open a process for reading and writing memory
    pub fn open_for_read_write(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::READ_WRITE)
    }

    /// Open a process with all access rights
    pub fn open_all_access(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::ALL_ACCESS)
    }

    /// Open the first process whose name matches
    pub fn open_by_name(name: &str, access: ProcessAccess) -> MemoryResult<Self> {
        let process = find_process_by_name(name)?;
        Self::open(process.pid, access)
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the access rights
    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    /// Check if the handle has not been closed
    pub fn is_valid(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Releases the OS reference. Later calls are no-ops.
    pub fn close(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!(pid = self.pid, "Closed process handle");
        }
    }

    fn with_raw<T>(&self, op: impl FnOnce(&RawProcess) -> MemoryResult<T>) -> MemoryResult<T> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(raw) => op(raw),
            None => Err(MemoryError::InvalidHandle(format!(
                "handle for PID {} is closed",
                self.pid
            ))),
        }
    }
}

impl TargetProcess for ProcessHandle {
    fn pid(&self) -> ProcessId {
        self.pid
    }

    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        self.with_raw(|raw| raw.read(address, buffer))
    }

    fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        self.with_raw(|raw| raw.write(address, data))
    }

    fn modules(&self) -> MemoryResult<Vec<ModuleInfo>> {
        self.with_raw(|raw| raw.modules())
    }

    fn regions(&self) -> MemoryResult<Vec<RegionInfo>> {
        self.with_raw(|raw| raw.regions())
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("valid", &self.is_valid())
            .field("access", &format!("0x{:X}", self.access.value()))
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessHandle(pid={}, valid={})",
            self.pid,
            self.is_valid()
        )
    }
}
