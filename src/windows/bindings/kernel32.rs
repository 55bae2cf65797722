//! Kernel32.dll bindings for process and memory operations

use crate::core::types::{Address, MemoryError, MemoryResult};
use crate::windows::types::Handle;
use crate::windows::utils::{last_error_message, ErrorCode};
use std::mem;
use winapi::shared::minwindef::{FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION};

/// Safe wrapper for OpenProcess
///
/// `ERROR_INVALID_PARAMETER` means the PID does not exist.
pub fn open_process(pid: u32, desired_access: u32) -> MemoryResult<Handle> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if !handle.is_null() {
        return Ok(Handle::new(handle));
    }

    let code = ErrorCode::last_error();
    let message = last_error_message("OpenProcess");
    match code {
        ErrorCode::InvalidParameter => Err(MemoryError::ProcessNotFound(format!("PID: {}", pid))),
        _ => Err(MemoryError::access_denied(pid, message)),
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle not closed elsewhere
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::InvalidHandle(last_error_message("CloseHandle")))
    } else {
        Ok(())
    }
}

/// Safe wrapper for ReadProcessMemory; a short read is a failure
pub fn read_process_memory(
    handle: &Handle,
    address: Address,
    buffer: &mut [u8],
) -> MemoryResult<()> {
    let mut bytes_read = 0;

    let result = unsafe {
        ReadProcessMemory(
            handle.raw(),
            address.as_usize() as LPCVOID,
            buffer.as_mut_ptr() as LPVOID,
            buffer.len(),
            &mut bytes_read,
        )
    };

    if result == FALSE {
        return Err(MemoryError::read_failed(
            address,
            last_error_message("ReadProcessMemory"),
        ));
    }
    if bytes_read != buffer.len() {
        return Err(MemoryError::read_failed(
            address,
            format!("partial read of {} of {} bytes", bytes_read, buffer.len()),
        ));
    }
    Ok(())
}

/// Safe wrapper for WriteProcessMemory; a short write is a failure
pub fn write_process_memory(handle: &Handle, address: Address, data: &[u8]) -> MemoryResult<()> {
    let mut bytes_written = 0;

    let result = unsafe {
        WriteProcessMemory(
            handle.raw(),
            address.as_usize() as LPVOID,
            data.as_ptr() as LPCVOID,
            data.len(),
            &mut bytes_written,
        )
    };

    if result == FALSE {
        return Err(MemoryError::write_failed(
            address,
            last_error_message("WriteProcessMemory"),
        ));
    }
    if bytes_written != data.len() {
        return Err(MemoryError::write_failed(
            address,
            format!("partial write of {} of {} bytes", bytes_written, data.len()),
        ));
    }
    Ok(())
}

/// Safe wrapper for VirtualQueryEx
///
/// Returns `None` past the end of the user address space.
pub fn virtual_query_ex(handle: &Handle, address: Address) -> Option<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };

    let written = unsafe {
        VirtualQueryEx(
            handle.raw(),
            address.as_usize() as LPCVOID,
            &mut mbi,
            mem::size_of::<MEMORY_BASIC_INFORMATION>(),
        )
    };

    (written != 0).then_some(mbi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_null_handle_operations() {
        let handle = Handle::null();

        let mut buffer = vec![0u8; 4];
        assert!(read_process_memory(&handle, Address::new(0x1000), &mut buffer).is_err());

        let data = vec![0u8; 4];
        assert!(write_process_memory(&handle, Address::new(0x1000), &data).is_err());

        assert!(virtual_query_ex(&handle, Address::new(0)).is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_invalid_process() {
        let result = open_process(0, 0x0410);
        assert!(matches!(result, Err(MemoryError::ProcessNotFound(_))));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_read_own_memory() {
        let handle = open_process(std::process::id(), 0x0410).unwrap();
        let value: u32 = 0xC0FFEE;
        let mut buffer = [0u8; 4];
        read_process_memory(
            &handle,
            Address::new(&value as *const u32 as usize),
            &mut buffer,
        )
        .unwrap();
        assert_eq!(u32::from_ne_bytes(buffer), 0xC0FFEE);
    }
}
