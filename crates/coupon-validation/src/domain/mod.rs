//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Coupon code normalization and the length gate
//! - Membership (Bloom) filter, its hash functions and sizing
//! - The arena-backed recency cache
//! - Source descriptors and validator configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod code;
pub mod config;
pub mod hash_functions;
pub mod membership_filter;
pub mod parameters;
pub mod recency_cache;
pub mod source;

pub use code::{normalize_record, CouponCode, MAX_CODE_LENGTH, MIN_CODE_LENGTH};
pub use config::{ValidatorConfig, ValidatorConfigBuilder};
pub use membership_filter::MembershipFilter;
pub use parameters::{calculate_fpr, calculate_optimal_parameters, FilterParams};
pub use recency_cache::{LruArena, RecencyCache};
pub use source::{CouponSource, SourceLocation};
