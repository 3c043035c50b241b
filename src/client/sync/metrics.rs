//! Cumulative drain counters.

use std::time::Duration;

use crate::shared::SyncReport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncMetrics {
    pub cycles: u64,
    pub synced: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Triggers ignored because a drain was already running
    pub overlapping_triggers: u64,
    pub last_cycle_duration: Option<Duration>,
}

impl SyncMetrics {
    pub fn record(&mut self, report: &SyncReport, duration: Duration) {
        self.cycles += 1;
        self.synced += report.synced as u64;
        self.failed += report.failed as u64;
        self.skipped += report.skipped as u64;
        self.last_cycle_duration = Some(duration);
    }

    /// Fraction of attempted submissions that succeeded
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.synced + self.failed;
        (attempted > 0).then(|| self.synced as f64 / attempted as f64)
    }
}
