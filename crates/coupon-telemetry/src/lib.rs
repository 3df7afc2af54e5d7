//! # Coupon Telemetry
//!
//! Observability for Coupon-Quorum processes.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, pretty for
//!   development or JSON for log shippers
//! - **Metrics**: Prometheus counters, gauges and histograms in a process-wide
//!   registry, rendered with [`encode_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coupon_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//!
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `coupon-quorum` | Service name in logs |
//! | `COUPON_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `COUPON_JSON_LOGS` | `false` | JSON log lines (default `true` in containers) |
//! | `COUPON_CONSOLE_OUTPUT` | `true` | Disable to silence logs entirely |

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, record_error, record_load, record_scan, record_validation, register_metrics,
    set_cache_entries, MetricsHandle, CACHE_ENTRIES, ERRORS, LOAD_DURATION, SCANS,
    SOURCE_ENTRIES, VALIDATIONS, VALIDATION_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Initialize metrics first so early events are counted
    let metrics_handle = register_metrics()?;

    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
