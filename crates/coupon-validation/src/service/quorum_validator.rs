//! Quorum Validator Service
//!
//! Orchestrates the tiered decision for each code: length gate, recency
//! cache, filter pre-screen, then concurrent confirmatory scans that stop as
//! soon as the quorum is decided either way.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::{SourceLoader, StreamingScanner, StreamingSourceReader};
use crate::domain::{CouponCode, CouponSource, RecencyCache, SourceLocation, ValidatorConfig};
use crate::error::{ConfigError, LoadError};
use crate::metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics, ScanResult};
use crate::ports::{
    ConfirmationScanner, CouponSourceReader, CouponValidatorApi, ScanOutcome, ValidatorStats,
    Verdict,
};
use crate::QUORUM;

/// The loaded sources, tagged with the load that produced them
#[derive(Default)]
struct SourceSet {
    generation: u64,
    sources: Vec<CouponSource>,
}

/// Quorum Validator implementation
///
/// Implements the `CouponValidatorApi` port using an injected source reader
/// (for loading) and confirmation scanner.
pub struct QuorumValidator<R, S> {
    loader: SourceLoader<R>,
    scanner: Arc<S>,
    /// Swapped whole on every load
    sources: RwLock<Arc<SourceSet>>,
    cache: RecencyCache<CouponCode, bool>,
    scan_timeout: Duration,
    metrics: Metrics,
    recorder: Arc<dyn MetricsRecorder>,
}

/// Validator over real files and URLs
pub type StreamingQuorumValidator =
    QuorumValidator<StreamingSourceReader, StreamingScanner<StreamingSourceReader>>;

impl StreamingQuorumValidator {
    /// Validator whose loader and scanner share one HTTP client
    pub fn streaming(config: &ValidatorConfig) -> Result<Self, LoadError> {
        let reader =
            Arc::new(StreamingSourceReader::from_config(config).map_err(LoadError::Reader)?);
        let scanner = Arc::new(StreamingScanner::new(Arc::clone(&reader)));
        Ok(Self::new(reader, scanner, config)?)
    }
}

impl<R, S> QuorumValidator<R, S>
where
    R: CouponSourceReader + 'static,
    S: ConfirmationScanner + 'static,
{
    pub fn new(
        reader: Arc<R>,
        scanner: Arc<S>,
        config: &ValidatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = config.cache_capacity_nonzero()?;

        Ok(Self {
            loader: SourceLoader::new(reader, config),
            scanner,
            sources: RwLock::new(Arc::new(SourceSet::default())),
            cache: RecencyCache::new(capacity),
            scan_timeout: config.scan_timeout,
            metrics: Metrics::new(),
            recorder: Arc::new(NoOpMetrics),
        })
    }

    /// Forward validator events to an external metrics system
    pub fn with_recorder(mut self, recorder: Arc<dyn MetricsRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_loaded(&self) -> bool {
        !self.sources.read().sources.is_empty()
    }

    /// Load with an externally owned cancellation token
    ///
    /// On success the source set is replaced and the cache cleared under
    /// one write lock. On failure nothing changes.
    pub async fn load_with_cancel(
        &self,
        locations: &[SourceLocation],
        cancel: &CancellationToken,
    ) -> Result<(), LoadError> {
        let started = Instant::now();
        let sources = self.loader.load(locations, cancel).await?;
        let entries: Vec<usize> = sources.iter().map(CouponSource::entries).collect();

        let generation = {
            let mut current = self.sources.write();
            let generation = current.generation + 1;
            *current = Arc::new(SourceSet {
                generation,
                sources,
            });
            self.cache.clear();
            generation
        };

        let elapsed = started.elapsed();
        self.metrics.record_load(&entries);
        self.recorder.record_load(&entries, elapsed);
        info!(
            generation,
            ?entries,
            elapsed_ms = elapsed.as_millis() as u64,
            "Coupon sources loaded"
        );
        Ok(())
    }

    /// Run the full decision and report how it was reached
    pub async fn evaluate(&self, raw: &str) -> Verdict {
        let code = CouponCode::normalize(raw);
        if !code.has_valid_length() {
            return Verdict::InvalidLength;
        }

        if let Some(valid) = self.cache.get(&code) {
            return Verdict::Cached(valid);
        }

        let snapshot = Arc::clone(&self.sources.read());
        if snapshot.sources.is_empty() {
            return Verdict::NotLoaded;
        }

        let candidates: Vec<&CouponSource> = snapshot
            .sources
            .iter()
            .filter(|source| source.might_contain(&code))
            .collect();
        if candidates.len() < QUORUM {
            self.remember(snapshot.generation, code, false);
            return Verdict::Prescreened;
        }

        let (confirmations, failures) = self.confirm(&code, &candidates).await;
        let valid = confirmations >= QUORUM;

        // A `false` reached with failed scans may be wrong; retry next time
        if valid || failures == 0 {
            self.remember(snapshot.generation, code, valid);
        }

        Verdict::Confirmed {
            confirmations,
            failures,
        }
    }

    /// Cache `valid` unless a reload happened since `generation` was read
    fn remember(&self, generation: u64, code: CouponCode, valid: bool) {
        let current = self.sources.read();
        if current.generation == generation {
            self.cache.set(code, valid);
        }
    }

    /// Scan candidates concurrently, returning (confirmations, failures)
    async fn confirm(&self, code: &CouponCode, candidates: &[&CouponSource]) -> (usize, usize) {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();
        for source in candidates {
            let scanner = Arc::clone(&self.scanner);
            let location = source.location().clone();
            let index = source.index();
            let code = code.clone();
            let cancel = cancel.clone();

            tasks.spawn(async move { (index, scanner.scan(&location, &code, &cancel).await) });
        }

        let mut confirmations = 0;
        let mut failures = 0;
        let mut pending = candidates.len();

        let search = async {
            while let Some(joined) = tasks.join_next().await {
                pending -= 1;
                let result = match joined {
                    Ok((_, Ok(ScanOutcome::Found))) => {
                        confirmations += 1;
                        ScanResult::Found
                    }
                    Ok((_, Ok(ScanOutcome::NotFound))) => ScanResult::NotFound,
                    Ok((_, Ok(ScanOutcome::Cancelled))) => ScanResult::Cancelled,
                    Ok((index, Err(e))) => {
                        warn!(source = index, error = %e, "Confirmatory scan failed");
                        failures += 1;
                        ScanResult::Failed
                    }
                    Err(e) => {
                        warn!(error = %e, "Confirmatory scan task failed");
                        failures += 1;
                        ScanResult::Failed
                    }
                };
                self.metrics.record_scan(result);
                self.recorder.record_scan(result);

                if confirmations >= QUORUM || confirmations + pending < QUORUM {
                    break;
                }
            }
        };

        if tokio::time::timeout(self.scan_timeout, search).await.is_err() {
            warn!(
                outstanding = pending,
                timeout_ms = self.scan_timeout.as_millis() as u64,
                "Confirmatory search timed out"
            );
            failures += pending;
        }

        // Stop stragglers; dropping `tasks` aborts them
        cancel.cancel();

        debug!(
            candidates = candidates.len(),
            confirmations, failures, "Confirmatory search finished"
        );
        (confirmations, failures)
    }
}

#[async_trait]
impl<R, S> CouponValidatorApi for QuorumValidator<R, S>
where
    R: CouponSourceReader + 'static,
    S: ConfirmationScanner + 'static,
{
    async fn load(&self, sources: &[SourceLocation]) -> Result<(), LoadError> {
        self.load_with_cancel(sources, &CancellationToken::new()).await
    }

    async fn validate(&self, code: &str) -> bool {
        let started = Instant::now();
        let verdict = self.evaluate(code).await;
        let elapsed = started.elapsed();

        self.metrics.record_validation(&verdict, elapsed);
        self.recorder.record_validation(&verdict, elapsed);
        debug!(
            outcome = verdict.label(),
            valid = verdict.is_valid(),
            elapsed_us = elapsed.as_micros() as u64,
            "Coupon validated"
        );
        verdict.is_valid()
    }

    fn stats(&self) -> ValidatorStats {
        let snapshot = Arc::clone(&self.sources.read());
        let per_source_sizes: Vec<usize> = snapshot
            .sources
            .iter()
            .map(CouponSource::entries)
            .collect();

        ValidatorStats {
            source_count: snapshot.sources.len(),
            total_entries: per_source_sizes.iter().sum(),
            per_source_sizes,
            cache_size: self.cache.len(),
            cache_capacity: self.cache.capacity(),
        }
    }
}
