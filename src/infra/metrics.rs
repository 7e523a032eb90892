//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//! All counter updates are lock-free; reporting is the only operation
//! that needs synchronization (via atomic swap).
//!
//! NOTE: All atomics use Relaxed ordering intentionally - these are
//! statistical counters only. Do NOT use them for coordination or logic
//! decisions.

use crate::domain::types::epoch_ms;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Update an atomic max value using a compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Lock-free metrics collector for the event pipeline
pub struct Metrics {
    /// Total events ever processed (monotonic)
    events_total: AtomicU64,
    /// Events since last report (reset on report)
    events_since_report: AtomicU64,
    /// Sum of processing latencies in microseconds (reset on report)
    latency_sum_us: AtomicU64,
    /// Max processing latency in microseconds (reset on report)
    latency_max_us: AtomicU64,
    /// Headings published (monotonic)
    headings_published: AtomicU64,
    /// Location fixes processed while navigating (monotonic)
    fixes_processed: AtomicU64,
    /// Place searches served (monotonic)
    searches_total: AtomicU64,
    /// Display updates dropped on a full queue (monotonic)
    updates_dropped: AtomicU64,
    /// Navigation sessions completed (monotonic)
    sessions_completed: AtomicU64,
    /// Epoch ms of the last report, for events/sec
    last_report_ms: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            events_total: AtomicU64::new(0),
            events_since_report: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_max_us: AtomicU64::new(0),
            headings_published: AtomicU64::new(0),
            fixes_processed: AtomicU64::new(0),
            searches_total: AtomicU64::new(0),
            updates_dropped: AtomicU64::new(0),
            sessions_completed: AtomicU64::new(0),
            last_report_ms: AtomicU64::new(epoch_ms()),
        }
    }

    pub fn record_event_processed(&self, latency_us: u64) {
        self.events_total.fetch_add(1, Ordering::Relaxed);
        self.events_since_report.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.latency_max_us, latency_us);
    }

    pub fn record_heading_published(&self) {
        self.headings_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fix_processed(&self) {
        self.fixes_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search(&self) {
        self.searches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update_dropped(&self) {
        self.updates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events_total(&self) -> u64 {
        self.events_total.load(Ordering::Relaxed)
    }

    pub fn updates_dropped(&self) -> u64 {
        self.updates_dropped.load(Ordering::Relaxed)
    }

    /// Swap the interval counters and build a report snapshot
    pub fn report(&self) -> MetricsSummary {
        let now_ms = epoch_ms();
        let last_ms = self.last_report_ms.swap(now_ms, Ordering::Relaxed);
        let elapsed_secs = (now_ms.saturating_sub(last_ms) as f64 / 1000.0).max(0.001);

        let events = self.events_since_report.swap(0, Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.swap(0, Ordering::Relaxed);
        let latency_max = self.latency_max_us.swap(0, Ordering::Relaxed);

        MetricsSummary {
            events_total: self.events_total.load(Ordering::Relaxed),
            events_per_sec: events as f64 / elapsed_secs,
            avg_latency_us: if events > 0 { latency_sum / events } else { 0 },
            max_latency_us: latency_max,
            headings_published: self.headings_published.load(Ordering::Relaxed),
            fixes_processed: self.fixes_processed.load(Ordering::Relaxed),
            searches_total: self.searches_total.load(Ordering::Relaxed),
            updates_dropped: self.updates_dropped.load(Ordering::Relaxed),
            sessions_completed: self.sessions_completed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of pipeline metrics for one reporting interval
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub events_total: u64,
    pub events_per_sec: f64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
    pub headings_published: u64,
    pub fixes_processed: u64,
    pub searches_total: u64,
    pub updates_dropped: u64,
    pub sessions_completed: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            events_total = %self.events_total,
            events_per_sec = %format!("{:.1}", self.events_per_sec),
            avg_latency_us = %self.avg_latency_us,
            max_latency_us = %self.max_latency_us,
            headings = %self.headings_published,
            fixes = %self.fixes_processed,
            searches = %self.searches_total,
            dropped_updates = %self.updates_dropped,
            sessions = %self.sessions_completed,
            "metrics_report"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_event_processed(100);
        metrics.record_event_processed(300);
        assert_eq!(metrics.events_total(), 2);

        let summary = metrics.report();
        assert_eq!(summary.events_total, 2);
        assert_eq!(summary.avg_latency_us, 200);
        assert_eq!(summary.max_latency_us, 300);
    }

    #[test]
    fn test_report_resets_interval_counters() {
        let metrics = Metrics::new();
        metrics.record_event_processed(500);
        metrics.report();

        let summary = metrics.report();
        assert_eq!(summary.avg_latency_us, 0);
        assert_eq!(summary.max_latency_us, 0);
        // Monotonic totals survive the swap
        assert_eq!(summary.events_total, 1);
    }

    #[test]
    fn test_domain_counters() {
        let metrics = Metrics::new();
        metrics.record_heading_published();
        metrics.record_heading_published();
        metrics.record_fix_processed();
        metrics.record_search();
        metrics.record_update_dropped();
        metrics.record_session_completed();

        let summary = metrics.report();
        assert_eq!(summary.headings_published, 2);
        assert_eq!(summary.fixes_processed, 1);
        assert_eq!(summary.searches_total, 1);
        assert_eq!(summary.updates_dropped, 1);
        assert_eq!(summary.sessions_completed, 1);
    }

    #[test]
    fn test_atomic_max_keeps_largest() {
        let max = AtomicU64::new(0);
        update_atomic_max(&max, 10);
        update_atomic_max(&max, 5);
        update_atomic_max(&max, 20);
        assert_eq!(max.load(Ordering::Relaxed), 20);
    }
}
