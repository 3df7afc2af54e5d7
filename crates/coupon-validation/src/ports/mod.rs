//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the process entry point and request handlers
//! - Driven Ports (outbound) - Source access and confirmatory scanning

pub mod inbound;
pub mod outbound;

pub use inbound::{CouponValidatorApi, ValidatorStats, Verdict};
pub use outbound::{ConfirmationScanner, CouponSourceReader, RecordReader, ScanOutcome};
