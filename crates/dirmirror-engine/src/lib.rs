//! Periodic synchronization engine for dirmirror
//!
//! This crate turns the one-shot reconciler from `dirmirror-sync` into a
//! long-running mirror:
//!
//! - **Scheduler**: runs a task on a fixed cadence whose start times never
//!   drift, catching up without skipping when a cycle overruns
//! - **Failure policy**: abort on the first failed cycle or log and carry on
//! - **Session**: binds source, destination, reconciler and scheduler, and
//!   keeps running totals
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_config::Config;
//! use dirmirror_engine::SyncSession;
//! use dirmirror_sync::TracingSink;
//! use dirmirror_types::SyncInterval;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let interval = SyncInterval::from_secs(30)?;
//! let session = SyncSession::from_config(
//!     "source_dir",
//!     "replica_dir",
//!     interval,
//!     &Config::default(),
//!     Arc::new(TracingSink),
//! );
//! let summary = session.run_cycles(3).await?;
//! println!("{} cycles, {} failed", summary.cycles, summary.failures);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod monitor;
pub mod scheduler;
pub mod session;

pub use monitor::{SessionStatistics, StatisticsCollector};
pub use scheduler::{CycleSummary, Scheduler, SchedulerConfig};
pub use session::SyncSession;
