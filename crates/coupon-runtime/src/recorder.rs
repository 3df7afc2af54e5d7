//! Bridges validator events into the process-wide Prometheus registry.

use std::time::Duration;

use coupon_validation::{MetricsRecorder, ScanResult, Verdict};

/// Forwards every validator event to `coupon_telemetry`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_validation(&self, verdict: &Verdict, duration: Duration) {
        coupon_telemetry::record_validation(
            verdict.label(),
            verdict.is_valid(),
            duration.as_secs_f64(),
        );
    }

    fn record_scan(&self, result: ScanResult) {
        coupon_telemetry::record_scan(result.label());
    }

    fn record_load(&self, per_source_entries: &[usize], duration: Duration) {
        coupon_telemetry::record_load(per_source_entries, duration.as_secs_f64());
    }
}
