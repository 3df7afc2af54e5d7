//! Inbound Ports (Driving Ports)
//!
//! The API the rest of the service uses: one `load` at startup, then
//! `validate` per request, plus read-only `stats`.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::SourceLocation;
use crate::error::LoadError;

/// Read-only introspection for operational monitoring
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidatorStats {
    /// Number of loaded sources (0 before load, 3 after)
    pub source_count: usize,
    /// Approximate entries per source, in source index order
    pub per_source_sizes: Vec<usize>,
    /// Sum of `per_source_sizes`
    pub total_entries: usize,
    /// Codes currently held by the recency cache
    pub cache_size: usize,
    /// Fixed cache bound
    pub cache_capacity: usize,
}

/// How a validation reached its answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Normalized length outside 8..=10
    InvalidLength,
    /// Answered from the recency cache
    Cached(bool),
    /// No sources have been loaded
    NotLoaded,
    /// Fewer than two filters reported a possible match
    Prescreened,
    /// Decided by confirmatory scans
    Confirmed {
        /// Sources that confirmed exact presence
        confirmations: usize,
        /// Scans that errored, panicked, or timed out
        failures: usize,
    },
}

impl Verdict {
    /// Final boolean answer
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Cached(valid) => *valid,
            Self::Confirmed { confirmations, .. } => *confirmations >= crate::QUORUM,
            Self::InvalidLength | Self::NotLoaded | Self::Prescreened => false,
        }
    }

    /// Short stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidLength => "invalid_length",
            Self::Cached(_) => "cached",
            Self::NotLoaded => "not_loaded",
            Self::Prescreened => "prescreened",
            Self::Confirmed { .. } => "confirmed",
        }
    }
}

/// Primary coupon validation API (Driving Port)
#[async_trait]
pub trait CouponValidatorApi: Send + Sync {
    /// Load exactly three sources, all-or-nothing
    ///
    /// Called once at startup before serving traffic. A later call replaces
    /// the whole source set atomically.
    async fn load(&self, sources: &[SourceLocation]) -> Result<(), LoadError>;

    /// Whether `code` is a valid coupon
    ///
    /// Never fails: internal errors surface only in logs and metrics.
    async fn validate(&self, code: &str) -> bool;

    /// Snapshot of source and cache sizes. Never mutates state.
    fn stats(&self) -> ValidatorStats;
}
