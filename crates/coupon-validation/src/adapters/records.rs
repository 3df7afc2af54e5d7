//! Newline-delimited record walking
//!
//! Both the loader and the scanner read sources the same way: one buffer
//! refill at a time, splitting complete lines out of the buffer in place.
//! Each refill races the cancellation token, so a read blocked on the network
//! is abandoned as soon as the token fires; between refills the token is
//! checked on every record.

use std::io;
use std::ops::ControlFlow;

use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;

use crate::ports::RecordReader;

/// Longest record handed to a visitor, in bytes
///
/// Codes are at most ten characters; anything far longer is not a code.
/// Longer records are dropped up to their next newline, which bounds the
/// carry buffer even for sources with no newlines at all.
pub const MAX_RECORD_LEN: usize = 1024;

/// How a walk over a source ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordWalk {
    /// Every record was visited
    Completed,
    /// The visitor asked to stop
    Stopped,
    /// The token fired first
    Cancelled,
}

/// Result of one [`walk_records`] call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkSummary {
    pub end: RecordWalk,
    /// Records longer than [`MAX_RECORD_LEN`] that were skipped
    pub oversized: usize,
}

/// Feed every record of `reader` (without its line terminator) to `visit`
///
/// A final record without a trailing newline is still visited. Records that
/// straddle a buffer boundary are reassembled in a small carry buffer.
///
/// After [`RecordWalk::Stopped`] the reader is positioned just past the
/// record that stopped the walk, so calling again resumes with the next one.
pub async fn walk_records<F>(
    reader: &mut RecordReader,
    cancel: &CancellationToken,
    mut visit: F,
) -> io::Result<WalkSummary>
where
    F: FnMut(&[u8]) -> ControlFlow<()>,
{
    let mut carry: Vec<u8> = Vec::new();
    // Inside an oversized record, discarding up to the next newline
    let mut skipping = false;
    let mut oversized = 0;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let end = RecordWalk::Cancelled;
                return Ok(WalkSummary { end, oversized });
            }
            chunk = reader.fill_buf() => chunk?,
        };

        if chunk.is_empty() {
            let end = if !skipping && !carry.is_empty() && visit(&carry).is_break() {
                RecordWalk::Stopped
            } else {
                RecordWalk::Completed
            };
            return Ok(WalkSummary { end, oversized });
        }

        let available = chunk.len();
        let mut rest = chunk;
        let mut outcome = None;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            if cancel.is_cancelled() {
                outcome = Some(RecordWalk::Cancelled);
                break;
            }
            let line = &rest[..pos];
            rest = &rest[pos + 1..];

            if skipping {
                skipping = false;
                continue;
            }
            if carry.len() + line.len() > MAX_RECORD_LEN {
                carry.clear();
                oversized += 1;
                continue;
            }

            let flow = if carry.is_empty() {
                visit(line)
            } else {
                carry.extend_from_slice(line);
                let flow = visit(&carry);
                carry.clear();
                flow
            };
            if flow.is_break() {
                outcome = Some(RecordWalk::Stopped);
                break;
            }
        }

        match outcome {
            Some(end) => {
                let used = available - rest.len();
                reader.consume(used);
                return Ok(WalkSummary { end, oversized });
            }
            None => {
                if !skipping {
                    if carry.len() + rest.len() > MAX_RECORD_LEN {
                        carry.clear();
                        skipping = true;
                        oversized += 1;
                    } else {
                        carry.extend_from_slice(rest);
                    }
                }
                reader.consume(available);
            }
        }
    }
}
