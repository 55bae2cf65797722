//! Byte signatures and scan directives

use crate::core::types::{MemoryError, MemoryResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Non-empty byte signature; `None` positions match any byte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    bytes: Vec<Option<u8>>,
}

impl Pattern {
    pub fn new(bytes: Vec<Option<u8>>) -> MemoryResult<Self> {
        if bytes.is_empty() {
            return Err(MemoryError::invalid_argument("Empty pattern"));
        }
        Ok(Pattern { bytes })
    }

    /// Pattern with no wildcards
    pub fn exact(bytes: &[u8]) -> MemoryResult<Self> {
        Self::new(bytes.iter().copied().map(Some).collect())
    }

    /// Parses a signature string such as `"48 8B ?? ?? 89"`
    ///
    /// Tokens are whitespace separated. Each is a two-digit hex byte, or
    /// `??` / `?` for a wildcard.
    pub fn parse(signature: &str) -> MemoryResult<Self> {
        let bytes = signature
            .split_whitespace()
            .map(|token| match token {
                "??" | "?" => Ok(None),
                hex if hex.len() == 2 => u8::from_str_radix(hex, 16)
                    .map(Some)
                    .map_err(|_| MemoryError::invalid_argument(format!("Invalid hex: {}", hex))),
                other => Err(MemoryError::invalid_argument(format!(
                    "Invalid hex byte '{}': must be 2 digits",
                    other
                ))),
            })
            .collect::<MemoryResult<Vec<_>>>()?;

        Self::new(bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Never true for a constructed pattern
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<u8>] {
        &self.bytes
    }

    /// Whether the pattern matches `haystack` starting at `offset`
    pub fn matches_at(&self, haystack: &[u8], offset: usize) -> bool {
        match haystack.get(offset..offset.saturating_add(self.len())) {
            Some(window) => self
                .bytes
                .iter()
                .zip(window)
                .all(|(expected, actual)| expected.map_or(true, |b| b == *actual)),
            None => false,
        }
    }

    /// Lowest offset in `haystack` where the pattern matches
    pub fn find_in(&self, haystack: &[u8]) -> Option<usize> {
        let last = haystack.len().checked_sub(self.len())?;
        (0..=last).find(|&i| self.matches_at(haystack, i))
    }

    /// Same result as [`find_in`](Self::find_in), matching on the rayon pool
    pub fn find_in_parallel(&self, haystack: &[u8]) -> Option<usize> {
        let last = haystack.len().checked_sub(self.len())?;
        (0..=last)
            .into_par_iter()
            .find_first(|&i| self.matches_at(haystack, i))
    }
}

impl FromStr for Pattern {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match byte {
                Some(b) => write!(f, "{:02X}", b)?,
                None => f.write_str("??")?,
            }
        }
        Ok(())
    }
}

/// How a match is turned into the returned address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ScanMode {
    /// `match + pattern_offset + address_offset`
    #[default]
    Normal = 0,
    /// `*(match + pattern_offset) + address_offset`
    Read = 1,
    /// `match + pattern_offset - address_offset`
    Subtract = 2,
}

impl TryFrom<u8> for ScanMode {
    type Error = MemoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ScanMode::Normal),
            1 => Ok(ScanMode::Read),
            2 => Ok(ScanMode::Subtract),
            other => Err(MemoryError::invalid_argument(format!(
                "unknown scan mode {}",
                other
            ))),
        }
    }
}

impl From<ScanMode> for u8 {
    fn from(mode: ScanMode) -> Self {
        mode as u8
    }
}

impl FromStr for ScanMode {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ScanMode::Normal),
            "read" => Ok(ScanMode::Read),
            "subtract" => Ok(ScanMode::Subtract),
            other => other
                .parse::<u8>()
                .map_err(|_| MemoryError::invalid_argument(format!("unknown scan mode '{}'", s)))
                .and_then(ScanMode::try_from),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Normal => f.write_str("NORMAL"),
            ScanMode::Read => f.write_str("READ"),
            ScanMode::Subtract => f.write_str("SUBTRACT"),
        }
    }
}

/// Positional adjustment applied to a pattern match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDirective {
    pub pattern_offset: usize,
    pub address_offset: usize,
    pub mode: ScanMode,
}

impl ScanDirective {
    pub const fn new(pattern_offset: usize, address_offset: usize, mode: ScanMode) -> Self {
        ScanDirective {
            pattern_offset,
            address_offset,
            mode,
        }
    }

    pub const fn normal(pattern_offset: usize, address_offset: usize) -> Self {
        Self::new(pattern_offset, address_offset, ScanMode::Normal)
    }

    pub const fn read(pattern_offset: usize, address_offset: usize) -> Self {
        Self::new(pattern_offset, address_offset, ScanMode::Read)
    }

    pub const fn subtract(pattern_offset: usize, address_offset: usize) -> Self {
        Self::new(pattern_offset, address_offset, ScanMode::Subtract)
    }
}
