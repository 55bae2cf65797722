//! Default configuration values for procmem

use serde::{Deserialize, Serialize};

/// Default scan chunk size (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default upper bound for a single buffer read (10MB)
pub const DEFAULT_MAX_READ_SIZE: usize = 10 * 1024 * 1024;

/// Default cap on NUL-terminated string reads
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1_000_000;

/// Upper bound for the deferred worker pool
pub const MAX_WORKER_THREADS: usize = 128;

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub memory: MemoryDefaults,
    pub dispatch: DispatchDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub chunk_size: usize,
    pub parallel: bool,
    pub skip_unreadable: bool,
}

/// Default memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDefaults {
    pub max_read_size: usize,
    pub max_string_length: usize,
}

/// Default dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchDefaults {
    pub worker_threads: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: false,
            skip_unreadable: false,
        },
        memory: MemoryDefaults {
            max_read_size: DEFAULT_MAX_READ_SIZE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        },
        dispatch: DispatchDefaults {
            worker_threads: num_cpus::get().clamp(1, 8),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
