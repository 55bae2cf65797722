//! Handle lifecycle and enumeration against the test process itself

use procmem::config::{Config, ScannerConfig};
use procmem::memory::flags::{MEM_COMMIT, MEM_IMAGE};
use procmem::{
    Address, MemoryEngine, MemoryError, MemoryValue, Pattern, ProcessAccess, ProcessHandle,
    ScanDirective, ValueType,
};
use std::process;
use std::sync::Arc;

/// Marker the scanner should find inside this test binary's image
static MARKER: [u8; 16] = *b"procmem-marker!\x7F";

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_list_processes_contains_self() {
    let processes = MemoryEngine::default().list_processes().unwrap();
    let me = processes
        .iter()
        .find(|p| p.pid == process::id())
        .expect("current process missing from listing");
    assert!(!me.name.is_empty());
    assert!(me.thread_count >= 1);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_open_nonexistent_pid() {
    let result = ProcessHandle::open_for_read(u32::MAX - 7);
    assert!(matches!(
        result,
        Err(MemoryError::ProcessNotFound(_)) | Err(MemoryError::AccessDenied { .. })
    ));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_open_by_unknown_name() {
    let result = MemoryEngine::default().open_by_name("no-such-process-procmem", None);
    assert!(matches!(result, Err(MemoryError::ProcessNotFound(_))));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_close_is_idempotent() {
    let engine = MemoryEngine::default();
    let handle = engine.open(process::id(), None).unwrap();
    assert!(handle.is_valid());

    engine.close(&handle);
    engine.close(&handle);
    assert!(!handle.is_valid());

    assert!(matches!(
        engine.list_modules(&handle),
        Err(MemoryError::InvalidHandle(_))
    ));
    assert!(matches!(
        engine.read(&handle, Address::new(MARKER.as_ptr() as usize), ValueType::U8),
        Err(MemoryError::InvalidHandle(_))
    ));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_read_own_memory() {
    let engine = MemoryEngine::default();
    let handle = engine.open(process::id(), None).unwrap();
    let local: u64 = 0x1122_3344_5566_7788;
    let address = Address::new(&local as *const u64 as usize);

    assert_eq!(
        engine.read(&handle, address, ValueType::U64).unwrap(),
        MemoryValue::U64(local)
    );
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_write_own_memory() {
    let engine = MemoryEngine::default();
    let handle = engine.open(process::id(), Some(ProcessAccess::READ_WRITE)).unwrap();
    let slot = Box::new(0u32);
    let address = Address::new(&*slot as *const u32 as usize);

    engine.write(&handle, address, &MemoryValue::U32(0xC0FFEE)).unwrap();
    assert_eq!(
        engine.read(&handle, address, ValueType::U32).unwrap(),
        MemoryValue::U32(0xC0FFEE)
    );
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_main_module_and_lookup() {
    let engine = MemoryEngine::default();
    let handle = engine.open(process::id(), None).unwrap();

    let modules = engine.list_modules(&handle).unwrap();
    assert!(!modules.is_empty());

    let main = engine.main_module(&handle).unwrap();
    assert_eq!(main, modules[0]);
    assert_eq!(engine.find_module(&handle, &main.name).unwrap(), main);
    assert_eq!(
        engine.find_module_by_pid(&main.name, process::id()).unwrap(),
        main
    );
    assert!(matches!(
        engine.find_module(&handle, "definitely-not-loaded.dll"),
        Err(MemoryError::ModuleNotFound(_))
    ));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_find_marker_in_main_module() {
    // The image may contain unmapped gaps between segments
    let engine = MemoryEngine::new(Config {
        scanner: ScannerConfig {
            chunk_size: 4096,
            skip_unreadable: true,
            ..ScannerConfig::default()
        },
        ..Config::default()
    });
    let handle = engine.open(process::id(), None).unwrap();
    let main = engine.main_module(&handle).unwrap();
    let marker_address = Address::new(MARKER.as_ptr() as usize);
    assert!(main.contains_address(marker_address));

    let pattern = Pattern::exact(&MARKER).unwrap();
    let found = engine
        .scan_range(&handle, marker_address, MARKER.len(), &pattern)
        .unwrap();
    assert_eq!(found, marker_address);

    let first = engine
        .find_pattern(&handle, &main.name, &pattern, ScanDirective::default())
        .unwrap();
    assert!(first <= marker_address);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_regions_cover_own_stack() {
    let engine = MemoryEngine::default();
    let handle = engine.open(process::id(), None).unwrap();
    let local = 5u8;
    let address = Address::new(&local as *const u8 as usize);

    let regions = engine.list_regions(&handle).unwrap();
    let region = regions
        .iter()
        .find(|r| r.contains(address))
        .expect("no region covers a stack variable");
    assert_eq!(region.state, MEM_COMMIT);
    assert!(region.is_readable());
    assert!(region.is_writable());
    assert!(regions.iter().any(|r| r.region_type == MEM_IMAGE));
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_deferred_close_invalidates_shared_handle() {
    let engine = MemoryEngine::default();
    let handle = Arc::new(engine.open(process::id(), None).unwrap());
    let deferred = engine.deferred();

    assert!(!deferred.list_modules(handle.clone()).wait().unwrap().is_empty());
    deferred.close(handle.clone()).wait().unwrap();
    assert!(matches!(
        deferred.list_modules(handle.clone()).wait(),
        Err(MemoryError::InvalidHandle(_))
    ));
    assert_eq!(handle.pid(), process::id());
}
