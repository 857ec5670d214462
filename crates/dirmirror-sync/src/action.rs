//! Structural changes and the sinks that record them
//!
//! The reconciler never logs directly. Each change it makes is handed to an
//! [`ActionSink`] supplied by the caller, so production code can route
//! records into `tracing` while tests collect them in memory.

use dirmirror_types::EntryKind;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Type of a structural change applied to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Destination did not exist and was created as a full copy of the source
    Bootstrap,
    /// Entry missing from the destination was copied over
    Copied,
    /// File content differed and the destination file was overwritten
    Updated,
    /// Entry changed between file and directory and was recreated
    Replaced,
    /// Entry absent from the source was deleted from the destination
    Removed,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bootstrap => "Bootstrap",
            Self::Copied => "Copied",
            Self::Updated => "Updated",
            Self::Replaced => "Replaced",
            Self::Removed => "Removed",
        };
        f.write_str(label)
    }
}

/// One structural change, ready to be logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAction {
    /// What happened
    pub kind: ActionKind,
    /// Entry name (for bootstrap, the destination directory name)
    pub name: String,
    /// Kind of the entry the destination now holds, or held before removal
    pub entry_kind: EntryKind,
    /// Path in the source tree
    pub source: PathBuf,
    /// Path in the destination tree
    pub destination: PathBuf,
    /// Number of top-level entries copied by a bootstrap
    pub entries: Option<usize>,
}

impl SyncAction {
    fn new(
        kind: ActionKind,
        entry_kind: EntryKind,
        source: &Path,
        destination: &Path,
    ) -> Self {
        let name = destination
            .file_name()
            .map_or_else(|| destination.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            kind,
            name,
            entry_kind,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            entries: None,
        }
    }

    /// Whole-tree copy into a destination that did not exist
    pub fn bootstrap(source: &Path, destination: &Path, entries: usize) -> Self {
        Self {
            entries: Some(entries),
            ..Self::new(ActionKind::Bootstrap, EntryKind::Directory, source, destination)
        }
    }

    /// New entry copied into the destination
    pub fn copied(source: &Path, destination: &Path, entry_kind: EntryKind) -> Self {
        Self::new(ActionKind::Copied, entry_kind, source, destination)
    }

    /// Destination file overwritten with changed source content
    pub fn updated(source: &Path, destination: &Path) -> Self {
        Self::new(ActionKind::Updated, EntryKind::File, source, destination)
    }

    /// Destination entry of the wrong kind recreated from the source
    pub fn replaced(source: &Path, destination: &Path, entry_kind: EntryKind) -> Self {
        Self::new(ActionKind::Replaced, entry_kind, source, destination)
    }

    /// Stale destination entry deleted
    pub fn removed(source: &Path, destination: &Path, entry_kind: EntryKind) -> Self {
        Self::new(ActionKind::Removed, entry_kind, source, destination)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Bootstrap => write!(
                f,
                "Copied {} entries from '{}' to '{}'",
                self.entries.unwrap_or_default(),
                self.source.display(),
                self.destination.display()
            ),
            ActionKind::Removed => write!(
                f,
                "Removed: '{}' from '{}'",
                self.name,
                self.destination
                    .parent()
                    .unwrap_or(&self.destination)
                    .display()
            ),
            ActionKind::Replaced => write!(
                f,
                "Replaced: '{}' at '{}' with a {}",
                self.name,
                self.destination.display(),
                self.entry_kind
            ),
            ActionKind::Copied | ActionKind::Updated => write!(
                f,
                "{}: '{}' to '{}'",
                self.kind,
                self.name,
                self.destination.display()
            ),
        }
    }
}

/// Receiver for structural changes
pub trait ActionSink: Send + Sync {
    /// Record one change
    fn record(&self, action: &SyncAction);
}

/// Sink that emits one `info` event per change
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActionSink for TracingSink {
    fn record(&self, action: &SyncAction) {
        info!(
            action = %action.kind,
            entry = %action.name,
            path = %action.destination.display(),
            "{}",
            action
        );
    }
}

/// Sink that keeps every change in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    actions: Mutex<Vec<SyncAction>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded changes, oldest first
    pub fn actions(&self) -> Vec<SyncAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded changes, oldest first
    pub fn take(&self) -> Vec<SyncAction> {
        std::mem::take(&mut *self.actions.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of recorded changes
    pub fn len(&self) -> usize {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionSink for MemorySink {
    fn record(&self, action: &SyncAction) {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.clone());
    }
}
