//! Metrics and tracing hooks for coupon validation
//!
//! Lock-free counters kept by the validator itself, plus the
//! [`MetricsRecorder`] hook through which a process can forward the same
//! events to an external system such as Prometheus.
//!
//! ## Usage
//!
//! ```ignore
//! use coupon_validation::metrics::Metrics;
//!
//! let metrics = Metrics::new();
//! let start = std::time::Instant::now();
//! let verdict = validator.evaluate("VALIDABC").await;
//! metrics.record_validation(&verdict, start.elapsed());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::ports::Verdict;

/// How one confirmatory scan ended, as seen by the orchestrator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanResult {
    Found,
    NotFound,
    Cancelled,
    /// I/O error, task panic, or search timeout
    Failed,
}

impl ScanResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// Metrics collector for validation operations
#[derive(Default)]
pub struct Metrics {
    /// Total `validate` calls
    pub validations: AtomicU64,
    /// Calls answered `true`
    pub validations_valid: AtomicU64,
    /// Rejected by the length gate
    pub length_rejections: AtomicU64,
    /// Answered from the recency cache
    pub cache_hits: AtomicU64,
    /// Rejected because fewer than two filters matched
    pub prescreen_rejections: AtomicU64,
    /// Calls that reached the confirmatory search
    pub confirm_searches: AtomicU64,
    /// Calls made before any source was loaded
    pub not_loaded: AtomicU64,
    pub scans_found: AtomicU64,
    pub scans_not_found: AtomicU64,
    pub scans_cancelled: AtomicU64,
    pub scans_failed: AtomicU64,
    /// Successful loads (initial and reloads)
    pub loads: AtomicU64,
    /// Entries seen by the most recent load, all sources
    pub entries_loaded: AtomicU64,
    /// Cumulative validation time in nanoseconds
    pub validation_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished validation
    pub fn record_validation(&self, verdict: &Verdict, duration: Duration) {
        self.validations.fetch_add(1, Ordering::Relaxed);
        self.validation_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if verdict.is_valid() {
            self.validations_valid.fetch_add(1, Ordering::Relaxed);
        }

        let counter = match verdict {
            Verdict::InvalidLength => &self.length_rejections,
            Verdict::Cached(_) => &self.cache_hits,
            Verdict::NotLoaded => &self.not_loaded,
            Verdict::Prescreened => &self.prescreen_rejections,
            Verdict::Confirmed { .. } => &self.confirm_searches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self, result: ScanResult) {
        let counter = match result {
            ScanResult::Found => &self.scans_found,
            ScanResult::NotFound => &self.scans_not_found,
            ScanResult::Cancelled => &self.scans_cancelled,
            ScanResult::Failed => &self.scans_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load(&self, per_source_entries: &[usize]) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let total: usize = per_source_entries.iter().sum();
        self.entries_loaded.store(total as u64, Ordering::Relaxed);
    }

    /// Average validation time in nanoseconds
    pub fn avg_validation_time_ns(&self) -> u64 {
        let total = self.validation_time_ns.load(Ordering::Relaxed);
        let count = self.validations.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Share of validations answered from the cache
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.validations.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations: self.validations.load(Ordering::Relaxed),
            validations_valid: self.validations_valid.load(Ordering::Relaxed),
            length_rejections: self.length_rejections.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            prescreen_rejections: self.prescreen_rejections.load(Ordering::Relaxed),
            confirm_searches: self.confirm_searches.load(Ordering::Relaxed),
            not_loaded: self.not_loaded.load(Ordering::Relaxed),
            scans_found: self.scans_found.load(Ordering::Relaxed),
            scans_not_found: self.scans_not_found.load(Ordering::Relaxed),
            scans_cancelled: self.scans_cancelled.load(Ordering::Relaxed),
            scans_failed: self.scans_failed.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            entries_loaded: self.entries_loaded.load(Ordering::Relaxed),
            avg_validation_ns: self.avg_validation_time_ns(),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub validations: u64,
    pub validations_valid: u64,
    pub length_rejections: u64,
    pub cache_hits: u64,
    pub prescreen_rejections: u64,
    pub confirm_searches: u64,
    pub not_loaded: u64,
    pub scans_found: u64,
    pub scans_not_found: u64,
    pub scans_cancelled: u64,
    pub scans_failed: u64,
    pub loads: u64,
    pub entries_loaded: u64,
    pub avg_validation_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this to forward validator events to an external metrics
/// system. The validator always keeps its own [`Metrics`] as well.
pub trait MetricsRecorder: Send + Sync {
    fn record_validation(&self, verdict: &Verdict, duration: Duration);

    fn record_scan(&self, result: ScanResult);

    /// Called once per successful load with entries in source index order
    fn record_load(&self, per_source_entries: &[usize], duration: Duration);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_validation(&self, _: &Verdict, _: Duration) {}
    fn record_scan(&self, _: ScanResult) {}
    fn record_load(&self, _: &[usize], _: Duration) {}
}
