//! Coupon sources
//!
//! A source is one of the three backing datasets: where it lives, plus the
//! membership filter built from it at load time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::code::CouponCode;
use super::membership_filter::MembershipFilter;
use crate::error::SourceError;

/// Where a dataset is read from
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLocation {
    /// `http://` or `https://` URL
    Remote(String),
    /// Filesystem path
    Local(PathBuf),
}

impl SourceLocation {
    pub fn local(path: impl AsRef<Path>) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl FromStr for SourceLocation {
    type Err = SourceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SourceError::InvalidLocation(raw.to_string()));
        }

        let lowered = raw.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Ok(Self::Remote(raw.to_string()));
        }

        let unknown_scheme = lowered.contains("://") && !lowered.starts_with("file://");
        let path = raw.strip_prefix("file://").unwrap_or(raw);
        if path.is_empty() || unknown_scheme {
            return Err(SourceError::InvalidLocation(raw.to_string()));
        }
        Ok(Self::Local(PathBuf::from(path)))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One loaded dataset. Immutable after load.
#[derive(Clone, Debug)]
pub struct CouponSource {
    index: usize,
    location: SourceLocation,
    filter: MembershipFilter,
    entries: usize,
}

impl CouponSource {
    pub fn new(
        index: usize,
        location: SourceLocation,
        filter: MembershipFilter,
        entries: usize,
    ) -> Self {
        Self {
            index,
            location,
            filter,
            entries,
        }
    }

    /// Stable index (0-2)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn filter(&self) -> &MembershipFilter {
        &self.filter
    }

    /// Approximate element count: non-empty records seen while loading
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Filter pre-screen; `false` is definitive
    pub fn might_contain(&self, code: &CouponCode) -> bool {
        self.filter.contains(code.as_bytes())
    }
}
