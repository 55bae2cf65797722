//! ToolHelp32 snapshots of processes and modules

use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessInfo};
use crate::windows::types::Handle;
use crate::windows::utils::{last_error_message, wide_to_string, ErrorCode};
use std::mem;
use tracing::warn;
use winapi::shared::minwindef::FALSE;
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Module32FirstW, Module32NextW, Process32FirstW, Process32NextW,
    MODULEENTRY32W, PROCESSENTRY32W, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32, TH32CS_SNAPPROCESS,
};

/// Module snapshots fail transiently while the target is loading modules
const MODULE_SNAPSHOT_ATTEMPTS: usize = 8;

fn create_snapshot(flags: u32, pid: u32) -> Result<Handle, ErrorCode> {
    let handle = Handle::new(unsafe { CreateToolhelp32Snapshot(flags, pid) });
    if handle.is_valid() {
        Ok(handle)
    } else {
        Err(ErrorCode::last_error())
    }
}

/// Lists all processes from one snapshot
pub fn process_snapshot() -> MemoryResult<Vec<ProcessInfo>> {
    let snapshot = create_snapshot(TH32CS_SNAPPROCESS, 0).map_err(|_| {
        MemoryError::enumeration_failed(last_error_message("CreateToolhelp32Snapshot"))
    })?;

    let mut entry: PROCESSENTRY32W = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

    let mut processes = Vec::new();
    let mut ok = unsafe { Process32FirstW(snapshot.raw(), &mut entry) };
    while ok != FALSE {
        processes.push(ProcessInfo {
            pid: entry.th32ProcessID,
            name: wide_to_string(&entry.szExeFile),
            parent_pid: Some(entry.th32ParentProcessID),
            thread_count: entry.cntThreads,
        });
        ok = unsafe { Process32NextW(snapshot.raw(), &mut entry) };
    }

    match ErrorCode::last_error() {
        ErrorCode::NoMoreFiles | ErrorCode::Success => Ok(processes),
        _ => Err(MemoryError::enumeration_failed(last_error_message(
            "Process32NextW",
        ))),
    }
}

/// Lists modules of `pid` from one snapshot, main image first
pub fn module_snapshot(pid: u32) -> MemoryResult<Vec<ModuleInfo>> {
    let flags = TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32;
    let mut attempt = 0;
    let snapshot = loop {
        attempt += 1;
        match create_snapshot(flags, pid) {
            Ok(snapshot) => break snapshot,
            Err(ErrorCode::BadLength) if attempt < MODULE_SNAPSHOT_ATTEMPTS => {
                warn!(pid, attempt, "Module snapshot raced with a module load, retrying");
            }
            Err(_) => {
                return Err(MemoryError::enumeration_failed(last_error_message(
                    "CreateToolhelp32Snapshot",
                )))
            }
        }
    };

    let mut entry: MODULEENTRY32W = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<MODULEENTRY32W>() as u32;

    let mut modules = Vec::new();
    let mut ok = unsafe { Module32FirstW(snapshot.raw(), &mut entry) };
    while ok != FALSE {
        modules.push(
            ModuleInfo::new(
                wide_to_string(&entry.szModule),
                Address::new(entry.modBaseAddr as usize),
                entry.modBaseSize as usize,
            )
            .with_path(wide_to_string(&entry.szExePath)),
        );
        ok = unsafe { Module32NextW(snapshot.raw(), &mut entry) };
    }

    match ErrorCode::last_error() {
        ErrorCode::NoMoreFiles | ErrorCode::Success => Ok(modules),
        _ => Err(MemoryError::enumeration_failed(last_error_message(
            "Module32NextW",
        ))),
    }
}
