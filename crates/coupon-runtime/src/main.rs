//! # Coupon-Quorum Runtime
//!
//! Loads the three coupon sources, then validates every command-line
//! argument, or every stdin line when no arguments are given. Each answer
//! is one JSON object on stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use coupon_runtime::{respond, run_lines, PrometheusRecorder, RuntimeConfig};
use coupon_telemetry::{init_telemetry, record_error, set_cache_entries, TelemetryConfig};
use coupon_validation::{CouponValidatorApi, StreamingQuorumValidator};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    info!(sources = ?config.sources, "Starting coupon runtime");

    let validator = StreamingQuorumValidator::streaming(&config.validator)
        .context("Failed to build validator")?
        .with_recorder(Arc::new(PrometheusRecorder));

    // Ctrl+C abandons a load in progress
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    if let Err(e) = validator.load_with_cancel(&config.sources, &cancel).await {
        record_error("load");
        error!(error = %e, "Failed to load coupon sources");
        return Err(e).context("Startup aborted");
    }

    let stats = validator.stats();
    set_cache_entries(stats.cache_size);
    info!(
        per_source = ?stats.per_source_sizes,
        total_entries = stats.total_entries,
        cache_capacity = stats.cache_capacity,
        "Ready"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let answered = if args.is_empty() {
        run_lines(&validator, BufReader::new(io::stdin()), io::stdout()).await?
    } else {
        let mut stdout = io::stdout();
        let mut answered = 0;
        for arg in &args {
            if let Some(response) = respond(&validator, arg).await? {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                answered += 1;
            }
        }
        stdout.flush().await?;
        answered
    };

    set_cache_entries(validator.stats().cache_size);
    info!(answered, metrics = ?validator.metrics(), "Done");
    Ok(())
}
