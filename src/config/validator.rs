//! Configuration validator for procmem
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::defaults::MAX_WORKER_THREADS;
use super::loader::{Config, ConfigError, DispatchConfig, LoggingConfig, MemoryConfig, ScannerConfig};
use tracing::warn;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_memory(&config.memory)?;
        Self::validate_dispatch(&config.dispatch)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        // Chunk reads stay page aligned
        if scanner.chunk_size == 0 || !scanner.chunk_size.is_power_of_two() {
            return Err(ConfigError::Invalid(
                "Chunk size must be a power of 2".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates memory configuration
    fn validate_memory(memory: &MemoryConfig) -> Result<(), ConfigError> {
        if memory.max_read_size == 0 {
            return Err(ConfigError::Invalid(
                "Maximum read size must be greater than 0".to_string(),
            ));
        }

        if memory.max_string_length == 0 {
            return Err(ConfigError::Invalid(
                "Maximum string length must be greater than 0".to_string(),
            ));
        }

        if memory.max_read_size > 100 * 1024 * 1024 {
            warn!(
                max_read_size = memory.max_read_size,
                "Maximum read size exceeds 100MB"
            );
        }

        Ok(())
    }

    fn validate_dispatch(dispatch: &DispatchConfig) -> Result<(), ConfigError> {
        if dispatch.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "Worker threads must be at least 1".to_string(),
            ));
        }

        if dispatch.worker_threads > MAX_WORKER_THREADS {
            return Err(ConfigError::Invalid(format!(
                "Worker threads cannot exceed {}",
                MAX_WORKER_THREADS
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
