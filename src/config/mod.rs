//! Configuration module for procmem
//!
//! Provides configuration loading, validation, and default settings
//! for the scanner, memory accessor and deferred workers.

mod defaults;
mod loader;
mod validator;

pub use defaults::{
    default_config, ConfigDefaults, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_READ_SIZE,
    DEFAULT_MAX_STRING_LENGTH, MAX_WORKER_THREADS,
};
pub use loader::{load_config, ConfigLoader, DEFAULT_CONFIG_FILE};
pub use validator::{validate_config, ConfigValidator};

// Re-export the configuration structures
pub use loader::{Config, DispatchConfig, LoggingConfig, MemoryConfig, ScannerConfig};

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
