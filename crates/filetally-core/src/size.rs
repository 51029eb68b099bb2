//! Size thresholds and size-string parsing.

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Inclusive range of file sizes, in bytes, that pass the size filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeThreshold {
    min: u64,
    max: u64,
}

impl SizeThreshold {
    /// Create a threshold, rejecting `min > max`.
    pub fn new(min: u64, max: u64) -> Result<Self, ScanError> {
        if min > max {
            return Err(ScanError::InvalidThreshold { min, max });
        }
        Ok(Self { min, max })
    }

    /// Threshold that accepts every size.
    pub const fn unbounded() -> Self {
        Self {
            min: 0,
            max: u64::MAX,
        }
    }

    /// Build from optional bounds, defaulting to the unbounded ends.
    pub fn from_bounds(min: Option<u64>, max: Option<u64>) -> Result<Self, ScanError> {
        Self::new(min.unwrap_or(0), max.unwrap_or(u64::MAX))
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    /// Check `min <= size <= max`.
    pub fn contains(&self, size: u64) -> bool {
        self.min <= size && size <= self.max
    }

    /// Whether this threshold filters anything out.
    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == u64::MAX
    }
}

impl Default for SizeThreshold {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Parse a human size string such as `500`, `10K`, `1.5 GB` or `2MiB`.
///
/// Units are case-insensitive and base 1024. Fractional byte counts are
/// truncated.
pub fn parse_size(input: &str) -> Result<u64, ScanError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ScanError::invalid_size(input, "empty size"));
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    if number.is_empty() {
        return Err(ScanError::invalid_size(input, "invalid size value"));
    }
    let value: f64 = number
        .parse()
        .map_err(|_| ScanError::invalid_size(input, "invalid size value"))?;

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        other => {
            return Err(ScanError::invalid_size(
                input,
                format!("invalid size unit '{other}'"),
            ));
        }
    };

    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(ScanError::invalid_size(input, "size out of range"));
    }
    Ok(bytes as u64)
}
