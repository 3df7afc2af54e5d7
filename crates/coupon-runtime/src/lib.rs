//! # Coupon Runtime
//!
//! Process wiring for Coupon-Quorum.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logs to stderr, Prometheus registry)
//! 2. Load and validate [`RuntimeConfig`] from the environment
//! 3. Build the streaming validator and load all three sources
//! 4. Answer codes from the command line, or from stdin line by line
//!
//! Any load failure aborts startup; the process never serves answers from a
//! partial source set.

pub mod config;
pub mod recorder;
pub mod session;

pub use config::{RuntimeConfig, RuntimeConfigError, DEFAULT_SOURCE_URLS, SOURCE_VARIABLES};
pub use recorder::PrometheusRecorder;
pub use session::{respond, run_lines, CouponOutput, INVALID_MESSAGE};
