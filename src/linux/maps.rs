//! Modules and regions from /proc/<pid>/maps
//!
//! Line format:
//! address           perms offset  dev   inode   pathname
//! 00400000-00452000 r-xp 00000000 08:02 173521  /usr/bin/ls

use crate::core::types::{Address, MemoryError, MemoryResult, ModuleInfo, ProcessId, RegionInfo};
use crate::memory::flags::{protection_from_rwx, MEM_COMMIT, MEM_IMAGE, MEM_MAPPED, MEM_PRIVATE};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

const DELETED_SUFFIX: &str = " (deleted)";

/// One line of a maps file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub start: usize,
    pub end: usize,
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub shared: bool,
    pub pathname: Option<String>,
}

impl MapEntry {
    fn is_file_backed(&self) -> bool {
        self.pathname.as_deref().is_some_and(|p| p.starts_with('/'))
    }
}

/// Reads the maps file of `pid`
pub fn read_maps(pid: ProcessId) -> MemoryResult<Vec<MapEntry>> {
    let path = format!("/proc/{}/maps", pid);
    let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("PID: {}", pid)),
        io::ErrorKind::PermissionDenied => MemoryError::access_denied(pid, e.to_string()),
        _ => MemoryError::enumeration_failed(format!("reading {}: {}", path, e)),
    })?;
    Ok(parse_maps(&content))
}

/// Parses maps content, skipping malformed lines
pub fn parse_maps(content: &str) -> Vec<MapEntry> {
    content.lines().filter_map(parse_map_line).collect()
}

fn parse_map_line(line: &str) -> Option<MapEntry> {
    let mut parts = line.splitn(6, char::is_whitespace).filter(|s| !s.is_empty());

    let (start, end) = parts.next()?.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;

    let perms = parts.next()?.as_bytes();
    let _offset = parts.next()?;
    let _device = parts.next()?;
    let _inode = parts.next()?;

    let pathname = parts
        .next()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.strip_suffix(DELETED_SUFFIX).unwrap_or(p).to_string());

    Some(MapEntry {
        start,
        end,
        read: perms.first() == Some(&b'r'),
        write: perms.get(1) == Some(&b'w'),
        execute: perms.get(2) == Some(&b'x'),
        shared: perms.get(3) == Some(&b's'),
        pathname,
    })
}

/// Groups file-backed mappings into modules
///
/// A module is any file with at least one executable mapping. Its base is
/// the lowest mapping of that file and its size runs to the highest end.
/// Order is first appearance, which puts the main executable first.
pub fn modules_from_maps(entries: &[MapEntry]) -> Vec<ModuleInfo> {
    let mut order: Vec<&str> = Vec::new();
    let mut bounds: Vec<(usize, usize, bool)> = Vec::new();

    for entry in entries.iter().filter(|e| e.is_file_backed()) {
        let Some(path) = entry.pathname.as_deref() else {
            continue;
        };
        match order.iter().position(|p| *p == path) {
            Some(i) => {
                let (start, end, exec) = &mut bounds[i];
                *start = (*start).min(entry.start);
                *end = (*end).max(entry.end);
                *exec |= entry.execute;
            }
            None => {
                order.push(path);
                bounds.push((entry.start, entry.end, entry.execute));
            }
        }
    }

    order
        .into_iter()
        .zip(bounds)
        .filter(|(_, (_, _, exec))| *exec)
        .map(|(path, (start, end, _))| {
            let name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            ModuleInfo::new(name, Address::new(start), end - start).with_path(path)
        })
        .collect()
}

/// Translates mappings into regions carrying Windows-valued flags
pub fn regions_from_maps(entries: &[MapEntry]) -> Vec<RegionInfo> {
    let module_paths: HashSet<&str> = entries
        .iter()
        .filter(|e| e.is_file_backed() && e.execute)
        .filter_map(|e| e.pathname.as_deref())
        .collect();

    entries
        .iter()
        .map(|entry| {
            let region_type = match entry.pathname.as_deref() {
                Some(path) if module_paths.contains(path) => MEM_IMAGE,
                Some(path) if path.starts_with('/') => MEM_MAPPED,
                _ if entry.shared => MEM_MAPPED,
                _ => MEM_PRIVATE,
            };
            RegionInfo {
                base_address: Address::new(entry.start),
                size: entry.end.saturating_sub(entry.start),
                protection: protection_from_rwx(entry.read, entry.write, entry.execute),
                state: MEM_COMMIT,
                region_type,
            }
        })
        .collect()
}
