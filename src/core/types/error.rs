//! Error taxonomy for procmem operations

use std::fmt;
use thiserror::Error;

/// Main error type for process and memory operations
///
/// Every engine operation reports failure through one of these variants.
/// Synchronous calls return it directly; deferred calls deliver it through
/// their completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: u32, reason: String },

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Pattern not found in memory")]
    PatternNotFound,

    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to write memory at {address}: {reason}")]
    WriteFailed { address: String, reason: String },

    #[error("Enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Deferred operation failed: {0}")]
    DispatchFailed(String),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an access denied error for a process
    pub fn access_denied(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a write failed error
    pub fn write_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        MemoryError::WriteFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        MemoryError::InvalidArgument(reason.into())
    }

    /// Creates an enumeration failed error
    pub fn enumeration_failed(reason: impl Into<String>) -> Self {
        MemoryError::EnumerationFailed(reason.into())
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            MemoryError::ProcessNotFound(_) => "ProcessNotFound",
            MemoryError::AccessDenied { .. } => "AccessDenied",
            MemoryError::InvalidHandle(_) => "InvalidHandle",
            MemoryError::ModuleNotFound(_) => "ModuleNotFound",
            MemoryError::PatternNotFound => "PatternNotFound",
            MemoryError::ReadFailed { .. } => "ReadFailed",
            MemoryError::WriteFailed { .. } => "WriteFailed",
            MemoryError::EnumerationFailed(_) => "EnumerationFailed",
            MemoryError::InvalidArgument(_) => "InvalidArgument",
            MemoryError::DispatchFailed(_) => "DispatchFailed",
        }
    }
}
