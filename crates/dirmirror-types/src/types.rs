//! Core data types for dirmirror

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a directory entry as seen by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Anything that is not a directory
    File,
    /// A directory
    Directory,
}

impl EntryKind {
    /// Classify from file metadata
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        if metadata.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Check whether this is a directory
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}
