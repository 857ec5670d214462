//! Point-in-time listings of a single directory level

use dirmirror_types::{EntryKind, Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::trace;

/// A named child of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// File name relative to the parent directory
    pub name: OsString,
    /// File or directory
    pub kind: EntryKind,
}

impl Entry {
    /// Create a new entry
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Lossy display form of the name, used in log records
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

/// The direct children of a directory at the instant it was listed
///
/// Entries are sorted by name so that sibling processing order, and with it
/// the order of log records, is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    entries: Vec<Entry>,
}

impl DirectorySnapshot {
    /// List `path` and classify every child
    pub async fn read(path: &Path) -> Result<Self> {
        let mut reader = fs::read_dir(path)
            .await
            .map_err(|e| Error::io("list directory", path, e))?;

        let mut entries = Vec::new();
        while let Some(dir_entry) = reader
            .next_entry()
            .await
            .map_err(|e| Error::io("list directory", path, e))?
        {
            let file_type = dir_entry
                .file_type()
                .await
                .map_err(|e| Error::io("inspect", &dir_entry.path(), e))?;

            let kind = if file_type.is_symlink() {
                // Classified by target; a dangling link is a file.
                fs::metadata(dir_entry.path())
                    .await
                    .map_or(EntryKind::File, |metadata| EntryKind::from_metadata(&metadata))
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            entries.push(Entry::new(dir_entry.file_name(), kind));
        }

        trace!("Listed {} entries in '{}'", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    /// Build a snapshot from already classified entries
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kind of the entry called `name`, if present
    pub fn kind_of(&self, name: &OsStr) -> Option<EntryKind> {
        self.entries
            .binary_search_by(|entry| entry.name.as_os_str().cmp(name))
            .ok()
            .map(|index| self.entries[index].kind)
    }

    /// Whether an entry called `name` is present
    pub fn contains(&self, name: &OsStr) -> bool {
        self.kind_of(name).is_some()
    }

    /// Entries in name order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// File entries in name order
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| !entry.kind.is_dir())
    }

    /// Directory entries in name order
    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.kind.is_dir())
    }

    /// Entries of `self` whose names do not appear in `other`
    pub fn missing_from<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a Entry> {
        self.entries
            .iter()
            .filter(move |entry| !other.contains(&entry.name))
    }

    /// Consume the snapshot, yielding entries in name order
    pub fn into_entries(self) -> std::vec::IntoIter<Entry> {
        self.entries.into_iter()
    }
}

/// Canonical directory form: no trailing separator, no `.` components
pub fn normalize_dir(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
