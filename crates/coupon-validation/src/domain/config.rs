//! Validator configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use coupon_validation::domain::ValidatorConfigBuilder;
//!
//! let config = ValidatorConfigBuilder::new()
//!     .cache_capacity(10_000)
//!     .target_fpr(0.01)
//!     .expected_entries(1_000_000)
//!     .build()?;
//! ```

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound on the recency cache
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Default target false positive rate per source filter
pub const DEFAULT_TARGET_FPR: f64 = 0.01;

/// Default sizing hint per source. At 1% FPR this is ~60 MB of filter per
/// source.
pub const DEFAULT_EXPECTED_ENTRIES: usize = 50_000_000;

/// Tiered validator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Maximum number of codes held by the recency cache
    pub cache_capacity: usize,
    /// Target false positive rate of each source filter, in (0, 1)
    pub target_fpr: f64,
    /// Expected records per source; sizes each filter
    pub expected_entries: usize,
    /// Upper bound on one request's confirmatory search
    pub scan_timeout: Duration,
    /// Upper bound on the startup load of all sources
    pub load_timeout: Duration,
    /// Per-request timeout for remote sources
    pub http_timeout: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            target_fpr: DEFAULT_TARGET_FPR,
            expected_entries: DEFAULT_EXPECTED_ENTRIES,
            scan_timeout: Duration::from_secs(30),
            load_timeout: Duration::from_secs(600),
            // Remote datasets run to several hundred MB
            http_timeout: Duration::from_secs(300),
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(self.cache_capacity));
        }

        // NaN fails both comparisons
        if !(self.target_fpr > 0.0 && self.target_fpr < 1.0) {
            return Err(ConfigError::InvalidFpr {
                fpr: self.target_fpr,
            });
        }

        if self.expected_entries == 0 {
            return Err(ConfigError::InvalidExpectedEntries(self.expected_entries));
        }

        for (name, timeout) in [
            ("scan timeout", self.scan_timeout),
            ("load timeout", self.load_timeout),
            ("HTTP timeout", self.http_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout { name });
            }
        }

        Ok(())
    }

    /// Cache capacity as a non-zero count
    pub fn cache_capacity_nonzero(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.cache_capacity)
            .ok_or(ConfigError::InvalidCacheCapacity(self.cache_capacity))
    }

    /// Builder-style method to set the cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Builder-style method to set the filter sizing hint
    pub fn with_expected_entries(mut self, entries: usize) -> Self {
        self.expected_entries = entries;
        self
    }

    /// Builder-style method to set the scan timeout
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }
}

/// Builder for [`ValidatorConfig`] with validation
#[derive(Default)]
pub struct ValidatorConfigBuilder {
    cache_capacity: Option<usize>,
    target_fpr: Option<f64>,
    expected_entries: Option<usize>,
    scan_timeout: Option<Duration>,
    load_timeout: Option<Duration>,
    http_timeout: Option<Duration>,
}

impl ValidatorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    pub fn expected_entries(mut self, entries: usize) -> Self {
        self.expected_entries = Some(entries);
        self
    }

    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = Some(timeout);
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Build and validate; unset fields take their defaults
    pub fn build(self) -> Result<ValidatorConfig, ConfigError> {
        let defaults = ValidatorConfig::default();
        let config = ValidatorConfig {
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            target_fpr: self.target_fpr.unwrap_or(defaults.target_fpr),
            expected_entries: self.expected_entries.unwrap_or(defaults.expected_entries),
            scan_timeout: self.scan_timeout.unwrap_or(defaults.scan_timeout),
            load_timeout: self.load_timeout.unwrap_or(defaults.load_timeout),
            http_timeout: self.http_timeout.unwrap_or(defaults.http_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}
