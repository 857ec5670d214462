//! Fixed-cadence scheduler for synchronization cycles

use dirmirror_config::Config;
use dirmirror_types::{Error, FailurePolicy, Result, SyncInterval};
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error};

/// Configuration for the scheduler
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Period between cycle starts
    pub interval: SyncInterval,
    /// What to do when a cycle fails
    pub failure_policy: FailurePolicy,
}

impl SchedulerConfig {
    /// Create a scheduler config with the default failure policy
    pub fn new(interval: SyncInterval) -> Self {
        Self {
            interval,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Create scheduler config from main config
    pub fn from_config(interval: SyncInterval, config: &Config) -> Self {
        Self {
            interval,
            failure_policy: config.sync.failure_policy,
        }
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Outcome of a bounded run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Cycles started
    pub cycles: u64,
    /// Cycles that returned an error and were tolerated
    pub failures: u64,
}

/// Runs a task on a fixed wall-clock period
///
/// Start times are anchored to the first deadline and advance by exactly
/// one interval per cycle, so the task's own running time never shifts the
/// schedule. A cycle that overruns makes the next one start immediately;
/// no cycle is skipped. Cycles never overlap.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Period between cycle starts
    pub fn interval(&self) -> SyncInterval {
        self.config.interval
    }

    /// Policy applied to failed cycles
    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    /// Run `task` every interval until a cycle fails under the abort policy
    ///
    /// The first cycle starts one interval after the call.
    pub async fn run_forever<F, Fut, T>(&self, task: F) -> Result<Infallible>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let summary = self.run(None, task).await?;
        Err(Error::other(format!(
            "Unbounded schedule stopped after {} cycles",
            summary.cycles
        )))
    }

    /// Run exactly `cycles` cycles with the same timing rules as [`run_forever`]
    ///
    /// [`run_forever`]: Self::run_forever
    pub async fn run_cycles<F, Fut, T>(&self, cycles: u64, task: F) -> Result<CycleSummary>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(Some(cycles), task).await
    }

    async fn run<F, Fut, T>(&self, limit: Option<u64>, mut task: F) -> Result<CycleSummary>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let period = self.config.interval.as_duration();
        let mut next_fire = advance(Instant::now(), period)?;
        let mut summary = CycleSummary::default();

        while limit.map_or(true, |limit| summary.cycles < limit) {
            // A deadline in the past completes immediately.
            sleep_until(next_fire).await;
            summary.cycles += 1;
            debug!("Starting synchronization cycle {}", summary.cycles);

            if let Err(err) = task().await {
                summary.failures += 1;
                error!("Synchronization cycle {} failed: {}", summary.cycles, err);
                if self.config.failure_policy == FailurePolicy::Abort || err.is_fatal() {
                    return Err(err);
                }
                debug!("Continuing with the next cycle");
            }

            next_fire = advance(next_fire, period)?;
        }

        Ok(summary)
    }
}

/// Next deadline, or a config error if the clock cannot represent it
fn advance(deadline: Instant, period: Duration) -> Result<Instant> {
    deadline.checked_add(period).ok_or_else(|| {
        Error::config(format!(
            "Sync interval of {}s cannot be scheduled on this clock",
            period.as_secs()
        ))
    })
}
