//! Session-wide statistics collection

use dirmirror_sync::SyncReport;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Running totals for a synchronization session
#[derive(Debug, Clone)]
pub struct SessionStatistics {
    /// Cycles that completed
    pub completed_cycles: u64,
    /// Cycles that returned an error
    pub failed_cycles: u64,
    /// Cycles that changed nothing
    pub idle_cycles: u64,
    /// Structural changes across all cycles
    pub total_changes: u64,
    /// Entries skipped after isolated failures
    pub skipped_entries: u64,
    /// Time spent inside reconciliation passes
    pub total_sync_time: Duration,
    /// Longest single pass
    pub longest_cycle: Duration,
    /// When the session started
    pub started: Instant,
}

impl Default for SessionStatistics {
    fn default() -> Self {
        Self {
            completed_cycles: 0,
            failed_cycles: 0,
            idle_cycles: 0,
            total_changes: 0,
            skipped_entries: 0,
            total_sync_time: Duration::ZERO,
            longest_cycle: Duration::ZERO,
            started: Instant::now(),
        }
    }
}

impl SessionStatistics {
    /// Cycles started so far
    pub fn total_cycles(&self) -> u64 {
        self.completed_cycles + self.failed_cycles
    }

    /// Mean duration of a completed pass
    pub fn average_cycle_time(&self) -> Duration {
        u32::try_from(self.completed_cycles)
            .ok()
            .filter(|&cycles| cycles > 0)
            .map_or(Duration::ZERO, |cycles| self.total_sync_time / cycles)
    }

    /// Time since the session started
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Shared collector the session updates after every cycle
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    stats: Arc<RwLock<SessionStatistics>>,
}

impl StatisticsCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a completed pass into the totals
    pub async fn record_cycle(&self, report: &SyncReport) {
        let mut stats = self.stats.write().await;
        stats.completed_cycles += 1;
        stats.total_changes += report.changes();
        stats.skipped_entries += report.errors;
        stats.total_sync_time += report.duration;
        stats.longest_cycle = stats.longest_cycle.max(report.duration);
        if report.is_noop() {
            stats.idle_cycles += 1;
        }
        debug!(
            "Session totals: {} cycles, {} changes",
            stats.total_cycles(),
            stats.total_changes
        );
    }

    /// Count a failed pass
    pub async fn record_failure(&self) {
        self.stats.write().await.failed_cycles += 1;
    }

    /// Snapshot of the current totals
    pub async fn snapshot(&self) -> SessionStatistics {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmirror_sync::ActionKind;

    fn report(changes: &[ActionKind], millis: u64) -> SyncReport {
        let mut report = SyncReport::new();
        for kind in changes {
            report.record(*kind);
        }
        report.duration = Duration::from_millis(millis);
        report
    }

    #[tokio::test]
    async fn test_record_cycles() {
        let collector = StatisticsCollector::new();

        collector
            .record_cycle(&report(&[ActionKind::Copied, ActionKind::Removed], 30))
            .await;
        collector.record_cycle(&report(&[], 10)).await;
        collector.record_failure().await;

        let stats = collector.snapshot().await;
        assert_eq!(stats.completed_cycles, 2);
        assert_eq!(stats.failed_cycles, 1);
        assert_eq!(stats.total_cycles(), 3);
        assert_eq!(stats.idle_cycles, 1);
        assert_eq!(stats.total_changes, 2);
        assert_eq!(stats.longest_cycle, Duration::from_millis(30));
        assert_eq!(stats.average_cycle_time(), Duration::from_millis(20));
    }

    #[test]
    fn test_average_without_cycles() {
        assert_eq!(SessionStatistics::default().average_cycle_time(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_clones_share_totals() {
        let collector = StatisticsCollector::new();
        let other = collector.clone();

        other.record_cycle(&report(&[ActionKind::Updated], 1)).await;

        assert_eq!(collector.snapshot().await.total_changes, 1);
    }
}
