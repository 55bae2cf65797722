//! Process enumeration from /proc

use crate::core::types::{MemoryError, MemoryResult, ProcessId, ProcessInfo};
use std::fs;
use std::path::Path;
use tracing::trace;

/// Kernel truncates `comm` to this many bytes
const COMM_MAX_LEN: usize = 15;

/// Lists every numeric /proc entry
///
/// Processes that exit mid-walk are skipped; failing to read /proc itself
/// is an `EnumerationFailed`.
pub fn enumerate_processes() -> MemoryResult<Vec<ProcessInfo>> {
    let entries = fs::read_dir("/proc")
        .map_err(|e| MemoryError::enumeration_failed(format!("reading /proc: {}", e)))?;

    let mut processes = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| MemoryError::enumeration_failed(format!("reading /proc: {}", e)))?;
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<ProcessId>().ok())
        else {
            continue;
        };

        match read_process(pid, &entry.path()) {
            Some(info) => processes.push(info),
            None => trace!(pid, "Process vanished during enumeration"),
        }
    }

    Ok(processes)
}

fn read_process(pid: ProcessId, dir: &Path) -> Option<ProcessInfo> {
    let stat = fs::read_to_string(dir.join("stat")).ok()?;
    let mut info = parse_stat(pid, &stat)?;

    if info.name.len() >= COMM_MAX_LEN {
        if let Ok(cmdline) = fs::read(dir.join("cmdline")) {
            if let Some(full) = full_name_from_cmdline(&info.name, &cmdline) {
                info.name = full;
            }
        }
    }

    Some(info)
}

/// Parses `/proc/<pid>/stat`
///
/// `comm` sits between the first `(` and the last `)` and may itself
/// contain spaces or parentheses.
pub(crate) fn parse_stat(pid: ProcessId, stat: &str) -> Option<ProcessInfo> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let name = stat.get(open + 1..close)?.to_string();

    // Fields after comm start at field 3 (state)
    let fields: Vec<&str> = stat.get(close + 1..)?.split_whitespace().collect();
    let parent_pid = fields.get(1)?.parse::<ProcessId>().ok();
    let thread_count = fields.get(17)?.parse::<u32>().ok()?;

    Some(ProcessInfo {
        pid,
        name,
        parent_pid: parent_pid.filter(|&ppid| ppid != 0),
        thread_count,
    })
}

/// Recovers an untruncated name from argv[0] when it extends `comm`
pub(crate) fn full_name_from_cmdline(comm: &str, cmdline: &[u8]) -> Option<String> {
    let argv0 = cmdline.split(|&b| b == 0).next()?;
    let argv0 = std::str::from_utf8(argv0).ok()?;
    let base = Path::new(argv0).file_name()?.to_str()?;
    (base.len() > comm.len() && base.starts_with(comm)).then(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STAT: &str = "1234 (my game) S 1 1234 1234 0 -1 4194560 100 0 0 0 5 3 0 0 20 0 7 0 \
                        12345 1000000 200 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 2 0 0";

    #[test]
    fn test_parse_stat() {
        let info = parse_stat(1234, STAT).unwrap();
        assert_eq!(
            info,
            ProcessInfo {
                pid: 1234,
                name: "my game".to_string(),
                parent_pid: Some(1),
                thread_count: 7,
            }
        );
    }

    #[test]
    fn test_parse_stat_parenthesised_comm() {
        let stat = STAT.replace("(my game)", "(a) b (c))");
        let info = parse_stat(1234, &stat).unwrap();
        assert_eq!(info.name, "a) b (c)");
        assert_eq!(info.thread_count, 7);
    }

    #[test]
    fn test_parse_stat_rejects_garbage() {
        assert!(parse_stat(1, "").is_none());
        assert!(parse_stat(1, "1 (x) S").is_none());
    }

    #[test]
    fn test_full_name_from_cmdline() {
        let cmdline = b"/opt/game/process_handle_test-0123abcd\0--flag\0";
        assert_eq!(
            full_name_from_cmdline("process_handle_", cmdline),
            Some("process_handle_test-0123abcd".to_string())
        );
        assert_eq!(full_name_from_cmdline("other", cmdline), None);
        assert_eq!(full_name_from_cmdline("x", b""), None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_enumerate_lists_self() {
        let processes = enumerate_processes().unwrap();
        let me = std::process::id();
        assert!(processes.iter().any(|p| p.pid == me));
    }
}
