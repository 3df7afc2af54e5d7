//! Outbound Ports (Driven Ports)
//!
//! Dependencies of the validator on the outside world: opening a dataset as
//! a byte stream, and scanning a dataset for one exact code.

use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;

use crate::domain::{CouponCode, SourceLocation};
use crate::error::{ScanError, SourceError};

/// Buffered, already-decompressed record stream of one source
pub type RecordReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// Opens sources for streaming (Driven Port)
///
/// Implementations must never buffer the whole dataset.
#[async_trait]
pub trait CouponSourceReader: Send + Sync {
    async fn open(&self, location: &SourceLocation) -> Result<RecordReader, SourceError>;
}

/// Result of a completed confirmatory scan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Found,
    NotFound,
    /// Stopped because the caller no longer needs the answer
    Cancelled,
}

/// Exact presence check of one code in one source (Driven Port)
#[async_trait]
pub trait ConfirmationScanner: Send + Sync {
    /// Scan `location` for `code`
    ///
    /// Must observe `cancel` at a bounded interval and return
    /// [`ScanOutcome::Cancelled`] promptly once it fires. I/O failures are
    /// reported as [`ScanError`], never as `NotFound`.
    async fn scan(
        &self,
        location: &SourceLocation,
        code: &CouponCode,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError>;
}
