//! Line-oriented validation session.
//!
//! Each input line is one coupon code and produces one JSON line. The word
//! `stats` prints the validator's stats instead; blank lines are skipped.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use coupon_validation::CouponValidatorApi;

pub const INVALID_MESSAGE: &str = "Coupon not found or invalid";

const STATS_COMMAND: &str = "stats";

/// Answer for one code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponOutput {
    /// The code exactly as received
    pub coupon: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CouponOutput {
    pub fn new(coupon: impl Into<String>, valid: bool) -> Self {
        Self {
            coupon: coupon.into(),
            valid,
            message: (!valid).then(|| INVALID_MESSAGE.to_string()),
        }
    }
}

/// Render the response for one input line, or `None` for a blank line.
pub async fn respond<V>(validator: &V, line: &str) -> serde_json::Result<Option<String>>
where
    V: CouponValidatorApi + ?Sized,
{
    if line.trim().is_empty() {
        return Ok(None);
    }

    if line.trim() == STATS_COMMAND {
        return serde_json::to_string(&validator.stats()).map(Some);
    }

    let valid = validator.validate(line).await;
    debug!(valid, "Coupon answered");
    serde_json::to_string(&CouponOutput::new(line, valid)).map(Some)
}

/// Answer every line of `input` on `output` until end of input.
///
/// Returns the number of responses written.
pub async fn run_lines<V, I, O>(validator: &V, input: I, mut output: O) -> anyhow::Result<usize>
where
    V: CouponValidatorApi + ?Sized,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut written = 0;

    while let Some(line) = lines.next_line().await? {
        if let Some(response) = respond(validator, &line).await? {
            output.write_all(response.as_bytes()).await?;
            output.write_all(b"\n").await?;
            written += 1;
        }
    }

    output.flush().await?;
    Ok(written)
}
