//! Engine facade over the process, memory and dispatch layers
//!
//! [`MemoryEngine`] carries the loaded [`Config`] so callers do not have to
//! thread limits and scan options through every call. Each operation is
//! generic over [`TargetProcess`], so it works with a [`ProcessHandle`] as
//! well as any other target implementation.

use crate::config::Config;
use crate::core::types::{
    Address, MemoryResult, MemoryValue, ModuleInfo, ProcessId, ProcessInfo, RegionInfo, ValueType,
};
use crate::dispatch::{dispatch, Completion};
use crate::memory::{MemoryReader, MemoryWriter, Pattern, PatternScanner, ScanDirective, ScanOptions};
use crate::process::{self, ModuleEnumerator, ProcessAccess, ProcessHandle, TargetProcess};
use std::sync::Arc;
use tracing::debug;

/// Synchronous entry point to every engine operation
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    config: Arc<Config>,
}

impl MemoryEngine {
    pub fn new(config: Config) -> Self {
        MemoryEngine {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Same operations, run through the dispatch workers
    pub fn deferred(&self) -> DeferredEngine {
        DeferredEngine {
            engine: self.clone(),
        }
    }

    pub fn list_processes(&self) -> MemoryResult<Vec<ProcessInfo>> {
        process::enumerate_processes()
    }

    pub fn find_processes_by_name(&self, name: &str) -> MemoryResult<Vec<ProcessInfo>> {
        process::find_processes_by_name(name)
    }

    pub fn find_process_by_name(&self, name: &str) -> MemoryResult<ProcessInfo> {
        process::find_process_by_name(name)
    }

    /// Opens `pid`; `None` requests read-only access
    pub fn open(&self, pid: ProcessId, access: Option<ProcessAccess>) -> MemoryResult<ProcessHandle> {
        ProcessHandle::open(pid, access.unwrap_or_default())
    }

    pub fn open_by_name(&self, name: &str, access: Option<ProcessAccess>) -> MemoryResult<ProcessHandle> {
        ProcessHandle::open_by_name(name, access.unwrap_or_default())
    }

    pub fn close(&self, handle: &ProcessHandle) {
        handle.close();
    }

    pub fn list_modules<P: TargetProcess + ?Sized>(&self, process: &P) -> MemoryResult<Vec<ModuleInfo>> {
        ModuleEnumerator::new(process).enumerate()
    }

    pub fn find_module<P: TargetProcess + ?Sized>(&self, process: &P, name: &str) -> MemoryResult<ModuleInfo> {
        ModuleEnumerator::new(process).find_by_name(name)
    }

    pub fn main_module<P: TargetProcess + ?Sized>(&self, process: &P) -> MemoryResult<ModuleInfo> {
        ModuleEnumerator::new(process).main_module()
    }

    /// Looks a module up without keeping a handle open
    pub fn find_module_by_pid(&self, name: &str, pid: ProcessId) -> MemoryResult<ModuleInfo> {
        process::find_module_by_pid(name, pid)
    }

    pub fn list_regions<P: TargetProcess + ?Sized>(&self, process: &P) -> MemoryResult<Vec<RegionInfo>> {
        process.regions()
    }

    pub fn read<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        address: Address,
        value_type: ValueType,
    ) -> MemoryResult<MemoryValue> {
        self.reader(process).read_value(address, value_type)
    }

    pub fn read_buffer<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        address: Address,
        size: usize,
    ) -> MemoryResult<Vec<u8>> {
        self.reader(process).read_bytes(address, size)
    }

    pub fn read_pointer<P: TargetProcess + ?Sized>(&self, process: &P, address: Address) -> MemoryResult<Address> {
        self.reader(process).read_pointer(address)
    }

    pub fn write<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        address: Address,
        value: &MemoryValue,
    ) -> MemoryResult<()> {
        self.writer(process).write_value(address, value)
    }

    pub fn write_buffer<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        address: Address,
        data: &[u8],
    ) -> MemoryResult<()> {
        self.writer(process).write_bytes(address, data)
    }

    /// Finds `pattern` in `module` and resolves the match with `directive`
    pub fn find_pattern<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        module: &str,
        pattern: &Pattern,
        directive: ScanDirective,
    ) -> MemoryResult<Address> {
        let address = self.scanner(process).find_pattern(module, pattern, directive)?;
        debug!(pid = process.pid(), module, %address, "Pattern resolved");
        Ok(address)
    }

    pub fn scan_range<P: TargetProcess + ?Sized>(
        &self,
        process: &P,
        start: Address,
        size: usize,
        pattern: &Pattern,
    ) -> MemoryResult<Address> {
        self.scanner(process).scan_range(start, size, pattern)
    }

    fn reader<'a, P: TargetProcess + ?Sized>(&self, process: &'a P) -> MemoryReader<'a, P> {
        MemoryReader::new(process, &self.config.memory)
    }

    fn writer<'a, P: TargetProcess + ?Sized>(&self, process: &'a P) -> MemoryWriter<'a, P> {
        MemoryWriter::new(process, &self.config.memory)
    }

    fn scanner<'a, P: TargetProcess + ?Sized>(&self, process: &'a P) -> PatternScanner<'a, P> {
        let options = ScanOptions::from(&self.config.scanner);
        PatternScanner::new(process, options, &self.config.memory)
    }
}

/// Deferred counterpart of [`MemoryEngine`]
///
/// Targets are shared with the worker through `Arc`. A handle closed while
/// an operation is queued makes that operation fail with `InvalidHandle`.
#[derive(Debug, Clone)]
pub struct DeferredEngine {
    engine: MemoryEngine,
}

impl DeferredEngine {
    pub fn engine(&self) -> &MemoryEngine {
        &self.engine
    }

    pub fn list_processes(&self) -> Completion<Vec<ProcessInfo>> {
        let engine = self.engine.clone();
        dispatch(move || engine.list_processes())
    }

    pub fn find_processes_by_name(&self, name: impl Into<String>) -> Completion<Vec<ProcessInfo>> {
        let engine = self.engine.clone();
        let name = name.into();
        dispatch(move || engine.find_processes_by_name(&name))
    }

    pub fn open(&self, pid: ProcessId, access: Option<ProcessAccess>) -> Completion<ProcessHandle> {
        let engine = self.engine.clone();
        dispatch(move || engine.open(pid, access))
    }

    pub fn open_by_name(&self, name: impl Into<String>, access: Option<ProcessAccess>) -> Completion<ProcessHandle> {
        let engine = self.engine.clone();
        let name = name.into();
        dispatch(move || engine.open_by_name(&name, access))
    }

    pub fn close(&self, handle: Arc<ProcessHandle>) -> Completion<()> {
        dispatch(move || {
            handle.close();
            Ok(())
        })
    }

    pub fn list_modules<P>(&self, process: Arc<P>) -> Completion<Vec<ModuleInfo>>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.list_modules(&*process))
    }

    pub fn find_module<P>(&self, process: Arc<P>, name: impl Into<String>) -> Completion<ModuleInfo>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        let name = name.into();
        dispatch(move || engine.find_module(&*process, &name))
    }

    pub fn list_regions<P>(&self, process: Arc<P>) -> Completion<Vec<RegionInfo>>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.list_regions(&*process))
    }

    pub fn read<P>(&self, process: Arc<P>, address: Address, value_type: ValueType) -> Completion<MemoryValue>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.read(&*process, address, value_type))
    }

    pub fn read_buffer<P>(&self, process: Arc<P>, address: Address, size: usize) -> Completion<Vec<u8>>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.read_buffer(&*process, address, size))
    }

    pub fn write<P>(&self, process: Arc<P>, address: Address, value: MemoryValue) -> Completion<()>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.write(&*process, address, &value))
    }

    pub fn write_buffer<P>(&self, process: Arc<P>, address: Address, data: Vec<u8>) -> Completion<()>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        dispatch(move || engine.write_buffer(&*process, address, &data))
    }

    pub fn find_pattern<P>(
        &self,
        process: Arc<P>,
        module: impl Into<String>,
        pattern: Pattern,
        directive: ScanDirective,
    ) -> Completion<Address>
    where
        P: TargetProcess + ?Sized + 'static,
    {
        let engine = self.engine.clone();
        let module = module.into();
        dispatch(move || engine.find_pattern(&*process, &module, &pattern, directive))
    }
}
