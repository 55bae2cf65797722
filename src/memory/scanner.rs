//! Signature scanning over module images and address ranges

use super::pattern::{Pattern, ScanDirective, ScanMode};
use super::reader::MemoryReader;
use crate::config::{MemoryConfig, ScannerConfig};
use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo};
use crate::process::{ModuleEnumerator, TargetProcess};
use tracing::{debug, trace, warn};

/// Options for pattern scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Match start positions covered by one read
    pub chunk_size: usize,
    /// Match inside each chunk on the rayon pool
    pub parallel: bool,
    /// Treat unreadable chunks as non-matching instead of failing
    pub skip_unreadable: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        ScanOptions {
            chunk_size: config.chunk_size,
            parallel: config.parallel,
            skip_unreadable: config.skip_unreadable,
        }
    }
}

/// Finds byte signatures in a target's memory
pub struct PatternScanner<'a, P: TargetProcess + ?Sized> {
    process: &'a P,
    options: ScanOptions,
    reader: MemoryReader<'a, P>,
}

impl<'a, P: TargetProcess + ?Sized> PatternScanner<'a, P> {
    /// Create a new scanner
    pub fn new(process: &'a P, options: ScanOptions, limits: &MemoryConfig) -> Self {
        PatternScanner {
            process,
            options,
            reader: MemoryReader::new(process, limits),
        }
    }

    /// Finds `pattern` in the named module and applies `directive`
    pub fn find_pattern(
        &self,
        module_name: &str,
        pattern: &Pattern,
        directive: ScanDirective,
    ) -> MemoryResult<Address> {
        let module = ModuleEnumerator::new(self.process).find_by_name(module_name)?;
        self.find_in_module(&module, pattern, directive)
    }

    /// Scans the image of `module`
    pub fn find_in_module(
        &self,
        module: &ModuleInfo,
        pattern: &Pattern,
        directive: ScanDirective,
    ) -> MemoryResult<Address> {
        debug!(
            module = %module.name,
            base = %module.base_address,
            size = module.size,
            pattern = %pattern,
            mode = %directive.mode,
            "Scanning module"
        );
        let found = self.scan_range(module.base_address, module.size, pattern)?;
        self.resolve(found, directive)
    }

    /// Address of the lowest match of `pattern` in `[start, start + size)`
    ///
    /// Memory is read in chunks that overlap by `pattern.len() - 1` bytes so
    /// a match straddling a chunk edge is still found.
    pub fn scan_range(&self, start: Address, size: usize, pattern: &Pattern) -> MemoryResult<Address> {
        let len = pattern.len();
        if len > size {
            return Err(MemoryError::PatternNotFound);
        }

        let chunk = self.options.chunk_size.max(1);
        let last_start = size - len;
        let mut buffer = vec![0u8; chunk.saturating_add(len - 1).min(size)];
        let mut offset = 0usize;

        while offset <= last_start {
            let window = chunk.saturating_add(len - 1).min(size - offset);
            let address = start.add(offset)?;
            let data = &mut buffer[..window];

            match self.process.read_memory(address, data) {
                Ok(()) => {
                    trace!(%address, window, "Scanning chunk");
                    let hit = if self.options.parallel {
                        pattern.find_in_parallel(data)
                    } else {
                        pattern.find_in(data)
                    };
                    if let Some(i) = hit {
                        return address.add(i);
                    }
                }
                Err(e) if self.options.skip_unreadable => {
                    warn!(%address, window, error = %e, "Skipping unreadable chunk");
                }
                Err(e) => return Err(e),
            }

            offset = match offset.checked_add(chunk) {
                Some(next) => next,
                None => break,
            };
        }

        Err(MemoryError::PatternNotFound)
    }

    /// Applies a directive to a match address
    pub fn resolve(&self, found: Address, directive: ScanDirective) -> MemoryResult<Address> {
        let at = found.add(directive.pattern_offset)?;
        match directive.mode {
            ScanMode::Normal => at.add(directive.address_offset),
            ScanMode::Read => self.reader.read_pointer(at)?.add(directive.address_offset),
            ScanMode::Subtract => at.sub(directive.address_offset),
        }
    }
}
