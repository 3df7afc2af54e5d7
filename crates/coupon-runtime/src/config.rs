//! # Runtime Configuration
//!
//! Source locations and validator tuning, read from the environment.
//! Unparsable numbers fall back to their defaults; the assembled
//! configuration is then validated as a whole.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use coupon_validation::{ConfigError, SourceError, SourceLocation, ValidatorConfig};

/// Public datasets used when no location is configured.
pub const DEFAULT_SOURCE_URLS: [&str; 3] = [
    "https://orderfoodonline-files.s3.ap-southeast-2.amazonaws.com/couponbase1.gz",
    "https://orderfoodonline-files.s3.ap-southeast-2.amazonaws.com/couponbase2.gz",
    "https://orderfoodonline-files.s3.ap-southeast-2.amazonaws.com/couponbase3.gz",
];

/// Variables naming the three sources, in source index order.
pub const SOURCE_VARIABLES: [&str; 3] = ["COUPON_FILE1_URL", "COUPON_FILE2_URL", "COUPON_FILE3_URL"];

/// Runtime configuration errors.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("{variable} is not a usable source location: {source}")]
    InvalidSource {
        variable: &'static str,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Validator(#[from] ConfigError),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Exactly three source locations, in index order.
    pub sources: Vec<SourceLocation>,
    /// Validator tuning.
    pub validator: ValidatorConfig,
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `COUPON_FILE1_URL`..`COUPON_FILE3_URL`: source URL or path
    /// - `COUPON_CACHE_CAPACITY`: recency cache bound (default: 10000)
    /// - `COUPON_TARGET_FPR`: per-source filter FPR (default: 0.01)
    /// - `COUPON_EXPECTED_ENTRIES`: filter sizing hint per source (default: 50000000)
    /// - `COUPON_SCAN_TIMEOUT_SECS`: confirmatory search bound (default: 30)
    /// - `COUPON_LOAD_TIMEOUT_SECS`: startup load bound (default: 600)
    /// - `COUPON_HTTP_TIMEOUT_SECS`: remote request bound (default: 300)
    pub fn from_env() -> Result<Self, RuntimeConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`], reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = Vec::with_capacity(SOURCE_VARIABLES.len());
        for (variable, default) in SOURCE_VARIABLES.into_iter().zip(DEFAULT_SOURCE_URLS) {
            let raw = lookup(variable)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string());
            let location = raw
                .parse()
                .map_err(|source| RuntimeConfigError::InvalidSource { variable, source })?;
            sources.push(location);
        }

        let defaults = ValidatorConfig::default();
        let validator = ValidatorConfig {
            cache_capacity: parse_or(&lookup, "COUPON_CACHE_CAPACITY", defaults.cache_capacity),
            target_fpr: parse_or(&lookup, "COUPON_TARGET_FPR", defaults.target_fpr),
            expected_entries: parse_or(
                &lookup,
                "COUPON_EXPECTED_ENTRIES",
                defaults.expected_entries,
            ),
            scan_timeout: seconds_or(&lookup, "COUPON_SCAN_TIMEOUT_SECS", defaults.scan_timeout),
            load_timeout: seconds_or(&lookup, "COUPON_LOAD_TIMEOUT_SECS", defaults.load_timeout),
            http_timeout: seconds_or(&lookup, "COUPON_HTTP_TIMEOUT_SECS", defaults.http_timeout),
        };

        let config = Self { sources, validator };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validator.validate()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = key, value = %raw, "Unparsable value, using default");
            default
        }),
        None => default,
    }
}

fn seconds_or<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    Duration::from_secs(parse_or(lookup, key, default.as_secs()))
}
