//! One-way directory tree reconciliation for dirmirror
//!
//! This crate makes a destination directory tree mirror a source tree:
//!
//! - **Snapshots**: sorted, per-level listings of both trees
//! - **Fingerprints**: streaming BLAKE3 digests that decide whether a file changed
//! - **Reconciler**: removes stale entries, copies new ones, overwrites changed
//!   files and recreates entries whose kind flipped between file and directory
//! - **Action sinks**: every structural change is handed to an injected sink
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_sync::{MemorySink, Reconciler};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = Arc::new(MemorySink::new());
//! let reconciler = Reconciler::new(sink.clone());
//! let report = reconciler.reconcile("source_dir".as_ref(), "dest_dir".as_ref()).await?;
//! println!("{} changes, {} entries recorded", report.changes(), sink.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod copy;
pub mod fingerprint;
pub mod reconciler;
pub mod report;
pub mod snapshot;

pub use action::{ActionKind, ActionSink, MemorySink, SyncAction, TracingSink};
pub use fingerprint::{fingerprint_file, ContentFingerprint};
pub use reconciler::{ReconcileOptions, Reconciler};
pub use report::SyncReport;
pub use snapshot::{normalize_dir, DirectorySnapshot, Entry};
