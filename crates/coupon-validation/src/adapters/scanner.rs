//! Confirmatory scanner
//!
//! Exact, linear presence check of one code in one source. Records are
//! normalized with the same rule as incoming codes before comparison.

use std::sync::Arc;

use async_trait::async_trait;
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;

use super::records::{walk_records, RecordWalk};
use crate::domain::{normalize_record, CouponCode, SourceLocation};
use crate::error::{ScanError, SourceError};
use crate::ports::{ConfirmationScanner, CouponSourceReader, ScanOutcome};

/// Scanner that re-streams a source through a [`CouponSourceReader`]
pub struct StreamingScanner<R> {
    reader: Arc<R>,
}

impl<R> StreamingScanner<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R> ConfirmationScanner for StreamingScanner<R>
where
    R: CouponSourceReader + 'static,
{
    async fn scan(
        &self,
        location: &SourceLocation,
        code: &CouponCode,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError> {
        let failure = |source: SourceError| ScanError::Source {
            location: location.to_string(),
            source,
        };

        let mut records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(ScanOutcome::Cancelled),
            opened = self.reader.open(location) => opened.map_err(failure)?,
        };

        let target = code.as_bytes();
        let walk = walk_records(&mut records, cancel, |record| {
            if normalize_record(record).as_ref() == target {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .map_err(|e| failure(SourceError::Io(e)))?;

        Ok(match walk.end {
            RecordWalk::Stopped => ScanOutcome::Found,
            RecordWalk::Completed => ScanOutcome::NotFound,
            RecordWalk::Cancelled => ScanOutcome::Cancelled,
        })
    }
}
