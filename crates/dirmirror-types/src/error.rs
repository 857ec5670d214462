//! Error types and handling for dirmirror
//!
//! Every failure raised while reconciling a tree or driving the schedule is
//! expressed as an [`Error`]. Errors carry a kind, a severity and a fatality
//! flag so the scheduler can decide between ending the session and carrying
//! on with the next cycle.

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - the entry can be skipped
    Low,
    /// Medium severity - the current cycle is compromised
    Medium,
    /// High severity - the cycle cannot make progress
    High,
    /// Critical severity - the session must end
    Critical,
}

/// Main error type for dirmirror operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// File or directory not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was not found
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path with permission issues
        path: PathBuf,
    },

    /// A path that must be a directory is something else
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Synchronization error
    #[error("Synchronization error: {message}")]
    Sync {
        /// Error message describing the synchronization issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors
    Config,
    /// Synchronization errors
    Sync,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. }
            | Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::NotADirectory { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
            Self::Sync { .. } => ErrorKind::Sync,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Medium,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } => ErrorSeverity::High,
            Self::NotADirectory { .. } => ErrorSeverity::High,
            Self::Config { .. } => ErrorSeverity::Critical,
            Self::Sync { .. } => ErrorSeverity::Medium,
            Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Whether the error must end the session regardless of failure policy
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Whether a later cycle could plausibly succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { .. } | Self::Sync { .. } | Self::Other { .. } => true,
            // The tree may be fixed up between cycles.
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } => true,
            Self::NotADirectory { .. } => true,
            Self::Config { .. } => false,
        }
    }

    /// Build an error from a failed I/O call on `path`
    ///
    /// `NotFound` and `PermissionDenied` map to their typed variants, every
    /// other kind is folded into [`Error::Io`] with the operation and path
    /// in the message.
    pub fn io(operation: &str, path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                message: format!("Failed to {} '{}': {}", operation, path.display(), source),
            },
        }
    }

    /// Create a new not-a-directory error
    pub fn not_a_directory<P: Into<PathBuf>>(path: P) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new sync error
    pub fn sync<S: Into<String>>(message: S) -> Self {
        Self::Sync {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
