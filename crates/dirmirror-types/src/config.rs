//! Configuration types for dirmirror
//!
//! Validated value types shared by the configuration layer, the reconciler
//! and the scheduler.

// Serde is imported conditionally through cfg_attr
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Period between the starts of two consecutive synchronization cycles
///
/// Always a whole, positive number of seconds. Fixed for the lifetime of a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u64", into = "u64"))]
pub struct SyncInterval(u64);

impl SyncInterval {
    /// Longest accepted interval: one year
    pub const MAX_SECS: u64 = 365 * 24 * 60 * 60;

    /// Create a new interval with validation
    pub fn from_secs(secs: u64) -> Result<Self, String> {
        if secs == 0 {
            Err("Sync interval must be a positive number of seconds".to_string())
        } else if secs > Self::MAX_SECS {
            Err(format!(
                "Sync interval must not exceed {} seconds (one year)",
                Self::MAX_SECS
            ))
        } else {
            Ok(Self(secs))
        }
    }

    /// Get the interval in whole seconds
    pub fn as_secs(self) -> u64 {
        self.0
    }

    /// Get the interval as a duration
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl TryFrom<u64> for SyncInterval {
    type Error = String;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<SyncInterval> for u64 {
    fn from(interval: SyncInterval) -> Self {
        interval.0
    }
}

impl FromStr for SyncInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: u64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a whole number of seconds", s))?;
        Self::from_secs(secs)
    }
}

impl fmt::Display for SyncInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// What the scheduler does when a cycle fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FailurePolicy {
    /// End the session on the first failed cycle
    #[default]
    Abort,
    /// Log the failure and keep the schedule running
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(format!("Unknown failure policy '{}'", other)),
        }
    }
}

/// Read buffer size used when fingerprinting file content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "usize", into = "usize"))]
pub struct BufferSize(usize);

impl BufferSize {
    /// Minimum buffer size (4KB)
    pub const MIN: usize = 4 * 1024;
    /// Maximum buffer size (64MB)
    pub const MAX: usize = 64 * 1024 * 1024;
    /// Default buffer size (64KB)
    pub const DEFAULT: usize = 64 * 1024;

    /// Create a new buffer size with validation
    pub fn new(size: usize) -> Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Buffer size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Buffer size {} exceeds maximum {}", size, Self::MAX))
        } else if !size.is_power_of_two() {
            Err(format!("Buffer size {} must be a power of two", size))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the buffer size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for BufferSize {
    type Error = String;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<BufferSize> for usize {
    fn from(size: BufferSize) -> Self {
        size.0
    }
}
