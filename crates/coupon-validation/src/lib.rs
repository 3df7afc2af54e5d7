//! # Coupon Validation
//!
//! Tiered coupon-code validation against three independently sourced
//! datasets. A code is valid when its normalized form is 8-10 characters
//! long and it appears in at least two of the three datasets.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure business logic, no I/O
//!   - `CouponCode`: normalization and the length gate
//!   - `MembershipFilter`: per-source Bloom filter
//!   - `RecencyCache`: arena-backed LRU of recent answers
//!   - `ValidatorConfig`: configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `CouponValidatorApi`: Driving port (inbound API)
//!   - `CouponSourceReader`, `ConfirmationScanner`: Driven ports
//!
//! - **Adapters Layer** (`adapters/`): Files, HTTP(S), gzip
//!   - `StreamingSourceReader`, `SourceLoader`, `StreamingScanner`
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `QuorumValidator`: Implements `CouponValidatorApi`
//!
//! ## Decision Tiers
//!
//! normalize -> length gate -> recency cache -> filter pre-screen ->
//! concurrent confirmatory scans (stopping at two confirmations) -> cache
//!
//! ## Invariants
//!
//! - Inserted keys always test positive in their filter; a filter "no" is final
//! - A `true` answer always rests on two exact confirmations
//! - The cache never holds more than its configured capacity
//!
//! ## Usage Example
//!
//! ```ignore
//! use coupon_validation::{CouponValidatorApi, StreamingQuorumValidator, ValidatorConfig};
//!
//! let config = ValidatorConfig::default();
//! let validator = StreamingQuorumValidator::streaming(&config)?;
//! validator.load(&locations).await?;
//!
//! assert!(validator.validate("  validabc ").await);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

/// Number of datasets every load must provide
pub const SOURCE_COUNT: usize = 3;

/// Confirmations required for a code to be valid
pub const QUORUM: usize = 2;

// Re-exports for convenience
pub use adapters::{SourceLoader, StreamingScanner, StreamingSourceReader};
pub use domain::{
    CouponCode, CouponSource, MembershipFilter, RecencyCache, SourceLocation, ValidatorConfig,
    ValidatorConfigBuilder,
};
pub use error::{ConfigError, LoadError, ScanError, SourceError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics, ScanResult};
pub use ports::{
    ConfirmationScanner, CouponSourceReader, CouponValidatorApi, RecordReader, ScanOutcome,
    ValidatorStats, Verdict,
};
pub use service::{QuorumValidator, StreamingQuorumValidator};
