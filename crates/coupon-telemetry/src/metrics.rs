//! Prometheus metrics for Coupon-Quorum.
//!
//! All metrics follow the naming convention: `coupon_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., validations_total)
//! - **Gauge**: Value that can go up or down (e.g., cache_entries)
//! - **Histogram**: Distribution of values (e.g., validation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // VALIDATION METRICS
    // =========================================================================

    /// Validations by decision tier and result
    pub static ref VALIDATIONS: CounterVec = CounterVec::new(
        Opts::new("coupon_validations_total", "Total coupon validations"),
        &["outcome", "result"]  // outcome: invalid_length/cached/not_loaded/prescreened/confirmed
    ).expect("metric creation failed");

    /// End-to-end validation latency
    pub static ref VALIDATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "coupon_validation_duration_seconds",
            "Time spent validating one coupon code"
        ).buckets(exponential_buckets(0.00001, 2.0, 22).unwrap())
    ).expect("metric creation failed");

    /// Confirmatory scans by outcome
    pub static ref SCANS: CounterVec = CounterVec::new(
        Opts::new("coupon_scans_total", "Confirmatory source scans"),
        &["outcome"]  // outcome: found/not_found/cancelled/failed
    ).expect("metric creation failed");

    /// Codes held by the recency cache
    pub static ref CACHE_ENTRIES: Gauge = Gauge::new(
        "coupon_cache_entries",
        "Number of codes in the recency cache"
    ).expect("metric creation failed");

    // =========================================================================
    // SOURCE METRICS
    // =========================================================================

    /// Entries per loaded source
    pub static ref SOURCE_ENTRIES: GaugeVec = GaugeVec::new(
        Opts::new("coupon_source_entries", "Records loaded per source"),
        &["source"]
    ).expect("metric creation failed");

    /// Full load duration (all sources)
    pub static ref LOAD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "coupon_load_duration_seconds",
            "Time spent loading all coupon sources"
        ).buckets(exponential_buckets(0.01, 2.0, 18).unwrap())
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Errors by type
    pub static ref ERRORS: CounterVec = CounterVec::new(
        Opts::new("coupon_errors_total", "Errors by type"),
        &["error_type"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Validation
        Box::new(VALIDATIONS.clone()),
        Box::new(VALIDATION_DURATION.clone()),
        Box::new(SCANS.clone()),
        Box::new(CACHE_ENTRIES.clone()),
        // Sources
        Box::new(SOURCE_ENTRIES.clone()),
        Box::new(LOAD_DURATION.clone()),
        // Errors
        Box::new(ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Record one finished validation.
pub fn record_validation(outcome: &str, valid: bool, seconds: f64) {
    let result = if valid { "valid" } else { "invalid" };
    VALIDATIONS.with_label_values(&[outcome, result]).inc();
    VALIDATION_DURATION.observe(seconds);
}

/// Record one confirmatory scan.
pub fn record_scan(outcome: &str) {
    SCANS.with_label_values(&[outcome]).inc();
}

/// Record a successful load; `entries` is in source index order.
pub fn record_load(entries: &[usize], seconds: f64) {
    for (index, count) in entries.iter().enumerate() {
        let source = index.to_string();
        SOURCE_ENTRIES
            .with_label_values(&[source.as_str()])
            .set(*count as f64);
    }
    LOAD_DURATION.observe(seconds);
}

pub fn set_cache_entries(entries: usize) {
    CACHE_ENTRIES.set(entries as f64);
}

pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
