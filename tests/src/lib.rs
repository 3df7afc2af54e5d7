//! # Coupon-Quorum Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs       # On-disk and gzip source builders
//! │   └── integration/      # Validator, runtime and telemetry together
//! └── benches/
//!     └── validation_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p coupon-tests
//! cargo bench -p coupon-tests
//! ```

pub mod fixtures;
pub mod integration;
