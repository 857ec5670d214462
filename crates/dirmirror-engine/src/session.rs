//! A synchronization session: one source, one destination, one cadence

use crate::monitor::{SessionStatistics, StatisticsCollector};
use crate::scheduler::{CycleSummary, Scheduler, SchedulerConfig};
use dirmirror_config::Config;
use dirmirror_sync::{normalize_dir, ActionSink, ReconcileOptions, Reconciler, SyncReport};
use dirmirror_types::{Error, Result, SyncInterval};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Periodically mirrors a source directory into a destination directory
#[derive(Debug)]
pub struct SyncSession {
    source: PathBuf,
    destination: PathBuf,
    reconciler: Reconciler,
    scheduler: Scheduler,
    statistics: StatisticsCollector,
}

impl SyncSession {
    /// Create a session from its parts
    pub fn new<S, D>(source: S, destination: D, reconciler: Reconciler, scheduler: Scheduler) -> Self
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        Self {
            source: normalize_dir(source.as_ref()),
            destination: normalize_dir(destination.as_ref()),
            reconciler,
            scheduler,
            statistics: StatisticsCollector::new(),
        }
    }

    /// Create a session whose policies come from `config`
    pub fn from_config<S, D>(
        source: S,
        destination: D,
        interval: SyncInterval,
        config: &Config,
        sink: Arc<dyn ActionSink>,
    ) -> Self
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let options = ReconcileOptions::default()
            .isolate_entry_failures(config.sync.isolate_entry_failures)
            .hash_buffer_size(config.sync.hash_buffer_size);
        let reconciler = Reconciler::with_options(options, sink);
        let scheduler = Scheduler::new(SchedulerConfig::from_config(interval, config));
        Self::new(source, destination, reconciler, scheduler)
    }

    /// Source directory
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination directory
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Scheduler driving the session
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Totals collected so far
    pub async fn statistics(&self) -> SessionStatistics {
        self.statistics.snapshot().await
    }

    /// Check that the source exists and is a directory
    pub async fn validate(&self) -> Result<()> {
        let metadata = fs::metadata(&self.source)
            .await
            .map_err(|e| Error::io("inspect source", &self.source, e))?;
        if !metadata.is_dir() {
            return Err(Error::not_a_directory(&self.source));
        }
        Ok(())
    }

    /// Run a single reconciliation pass right away
    pub async fn run_cycle(&self) -> Result<SyncReport> {
        match self.reconciler.reconcile(&self.source, &self.destination).await {
            Ok(report) => {
                debug!("Synchronization cycle finished: {}", report);
                self.statistics.record_cycle(&report).await;
                Ok(report)
            }
            Err(e) => {
                self.statistics.record_failure().await;
                Err(e)
            }
        }
    }

    /// Run `cycles` scheduled passes, the first one interval from now
    pub async fn run_cycles(&self, cycles: u64) -> Result<CycleSummary> {
        self.start().await?;
        self.scheduler.run_cycles(cycles, || self.run_cycle()).await
    }

    /// Run scheduled passes until one fails under the abort policy
    pub async fn run_forever(&self) -> Result<Infallible> {
        self.start().await?;
        self.scheduler.run_forever(|| self.run_cycle()).await
    }

    async fn start(&self) -> Result<()> {
        self.validate().await?;
        info!("New synchronization session started!");
        debug!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            interval = %self.scheduler.interval(),
            policy = ?self.scheduler.failure_policy(),
            "Session configuration"
        );
        Ok(())
    }
}
