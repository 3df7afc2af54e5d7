//! Error types for the coupon validation subsystem

use std::time::Duration;

use thiserror::Error;

/// Invalid validator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid false positive rate: {fpr} (must be between 0 and 1, exclusive)")]
    InvalidFpr { fpr: f64 },

    #[error("Invalid cache capacity: {0} (must be greater than 0)")]
    InvalidCacheCapacity(usize),

    #[error("Invalid expected entries: {0} (must be greater than 0)")]
    InvalidExpectedEntries(usize),

    #[error("Invalid {name}: must be greater than zero")]
    InvalidTimeout { name: &'static str },
}

/// Errors raised while opening or reading a coupon source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Invalid source location: {0:?}")]
    InvalidLocation(String),
}

/// Startup load failures. Any of these must abort startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Expected {expected} coupon sources, got {actual}")]
    SourceCount { expected: usize, actual: usize },

    #[error("Failed to load source {index} ({location}): {source}")]
    Source {
        index: usize,
        location: String,
        #[source]
        source: SourceError,
    },

    #[error("Source load was cancelled")]
    Cancelled,

    #[error("Source load timed out after {0:?}")]
    Timeout(Duration),

    #[error("Loader task failed: {0}")]
    Task(String),

    #[error("Failed to initialise source reader: {0}")]
    Reader(#[source] SourceError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A confirmatory scan that could not complete
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to scan {location}: {source}")]
    Source {
        location: String,
        #[source]
        source: SourceError,
    },
}
