//! Per-cycle reconciliation summary

use crate::action::ActionKind;
use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// What one reconciliation pass did
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Wall-clock start of the pass
    pub started_at: DateTime<Local>,
    /// Time spent in the pass
    pub duration: Duration,
    /// Destination was created from scratch
    pub bootstrapped: bool,
    /// New entries copied
    pub copied: u64,
    /// Files overwritten because their content changed
    pub updated: u64,
    /// Entries recreated after a file/directory mismatch
    pub replaced: u64,
    /// Stale entries removed
    pub removed: u64,
    /// Files compared and found identical
    pub unchanged: u64,
    /// Entries skipped after a failure
    pub errors: u64,
}

impl SyncReport {
    /// Start an empty report
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            duration: Duration::ZERO,
            bootstrapped: false,
            copied: 0,
            updated: 0,
            replaced: 0,
            removed: 0,
            unchanged: 0,
            errors: 0,
        }
    }

    /// Count one structural change
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Bootstrap => self.bootstrapped = true,
            ActionKind::Copied => self.copied += 1,
            ActionKind::Updated => self.updated += 1,
            ActionKind::Replaced => self.replaced += 1,
            ActionKind::Removed => self.removed += 1,
        }
    }

    /// Number of structural changes made
    pub fn changes(&self) -> u64 {
        u64::from(self.bootstrapped) + self.copied + self.updated + self.replaced + self.removed
    }

    /// Whether the pass found the destination already in sync
    pub fn is_noop(&self) -> bool {
        self.changes() == 0 && self.errors == 0
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bootstrapped {
            return write!(f, "bootstrap copy in {:?}", self.duration);
        }
        write!(
            f,
            "{} copied, {} updated, {} replaced, {} removed, {} unchanged, {} errors in {:?}",
            self.copied,
            self.updated,
            self.replaced,
            self.removed,
            self.unchanged,
            self.errors,
            self.duration
        )
    }
}
