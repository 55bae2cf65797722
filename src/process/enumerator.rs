//! System-wide process enumeration

use crate::core::types::{MemoryError, MemoryResult, ProcessInfo};
use tracing::debug;

#[cfg(target_os = "linux")]
use crate::linux as backend;
#[cfg(windows)]
use crate::windows as backend;

/// Enumerate all running processes from one OS snapshot
///
/// Order is whatever the OS reports. Any OS failure discards the partial list.
pub fn enumerate_processes() -> MemoryResult<Vec<ProcessInfo>> {
    let processes = backend::enumerate_processes()?;
    debug!(count = processes.len(), "Enumerated processes");
    Ok(processes)
}

/// Find processes by name
///
/// Case-insensitive on Windows, exact elsewhere.
pub fn find_processes_by_name(name: &str) -> MemoryResult<Vec<ProcessInfo>> {
    let processes = enumerate_processes()?;
    Ok(processes
        .into_iter()
        .filter(|p| p.name_matches(name))
        .collect())
}

/// Find the first process with the given name
pub fn find_process_by_name(name: &str) -> MemoryResult<ProcessInfo> {
    find_processes_by_name(name)?
        .into_iter()
        .next()
        .ok_or_else(|| MemoryError::ProcessNotFound(name.to_string()))
}
