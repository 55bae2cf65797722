//! Module enumeration inside a target process

use super::handle::ProcessHandle;
use super::target::TargetProcess;
use crate::core::types::{MemoryError, MemoryResult, ModuleInfo, ProcessId};
use tracing::debug;

/// Enumerates modules loaded in a process
pub struct ModuleEnumerator<'a, P: TargetProcess + ?Sized> {
    process: &'a P,
}

impl<'a, P: TargetProcess + ?Sized> ModuleEnumerator<'a, P> {
    /// Create a new module enumerator for a process
    pub fn new(process: &'a P) -> Self {
        ModuleEnumerator { process }
    }

    /// Enumerate all modules in OS order; each call re-queries the target
    pub fn enumerate(&self) -> MemoryResult<Vec<ModuleInfo>> {
        let modules = self.process.modules()?;
        debug!(
            pid = self.process.pid(),
            count = modules.len(),
            "Enumerated modules"
        );
        Ok(modules)
    }

    /// Find the first module whose name matches
    pub fn find_by_name(&self, name: &str) -> MemoryResult<ModuleInfo> {
        self.enumerate()?
            .into_iter()
            .find(|m| m.name_matches(name))
            .ok_or_else(|| MemoryError::ModuleNotFound(name.to_string()))
    }

    /// The main executable image (first module in OS order)
    pub fn main_module(&self) -> MemoryResult<ModuleInfo> {
        self.enumerate()?.into_iter().next().ok_or_else(|| {
            MemoryError::ModuleNotFound(format!("main module of PID {}", self.process.pid()))
        })
    }
}

/// Opens a short-lived handle to `pid` and looks up a module by name
pub fn find_module_by_pid(name: &str, pid: ProcessId) -> MemoryResult<ModuleInfo> {
    let handle = ProcessHandle::open_for_read(pid)?;
    let result = ModuleEnumerator::new(&handle).find_by_name(name);
    handle.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Address;
    use crate::process::target::mock::MockTarget;

    #[test]
    fn test_find_by_name() {
        let target = MockTarget::new(0x1000, vec![0; 16])
            .with_module(ModuleInfo::new("libgame.so", Address::new(0x8000), 0x100));
        let modules = ModuleEnumerator::new(&target);

        let found = modules.find_by_name("libgame.so").unwrap();
        assert_eq!(found.base_address, Address::new(0x8000));

        assert_eq!(
            modules.find_by_name("missing.so"),
            Err(MemoryError::ModuleNotFound("missing.so".to_string()))
        );
    }

    #[test]
    fn test_main_module_is_first() {
        let target = MockTarget::new(0x1000, vec![0; 16])
            .with_module(ModuleInfo::new("other", Address::new(0x8000), 0x100));
        let main = ModuleEnumerator::new(&target).main_module().unwrap();
        assert_eq!(main.name, "target.exe");
    }

    #[test]
    fn test_enumeration_is_idempotent() {
        let target = MockTarget::new(0x1000, vec![0; 16]);
        let modules = ModuleEnumerator::new(&target);
        assert_eq!(modules.enumerate().unwrap(), modules.enumerate().unwrap());
    }
}
