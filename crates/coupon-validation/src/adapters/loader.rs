//! Source loader
//!
//! Builds one membership filter per source, all three concurrently. Every
//! source is streamed exactly once; nothing but the filter is kept.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::records::{walk_records, RecordWalk, MAX_RECORD_LEN};
use crate::domain::{
    calculate_fpr, normalize_record, CouponSource, MembershipFilter, SourceLocation,
    ValidatorConfig,
};
use crate::error::{LoadError, SourceError};
use crate::ports::CouponSourceReader;
use crate::SOURCE_COUNT;

/// All-or-nothing loader for the three coupon sources
pub struct SourceLoader<R> {
    reader: Arc<R>,
    expected_entries: usize,
    target_fpr: f64,
    load_timeout: Duration,
}

impl<R> SourceLoader<R>
where
    R: CouponSourceReader + 'static,
{
    pub fn new(reader: Arc<R>, config: &ValidatorConfig) -> Self {
        Self {
            reader,
            expected_entries: config.expected_entries,
            target_fpr: config.target_fpr,
            load_timeout: config.load_timeout,
        }
    }

    /// Load every location, returning sources in index order
    ///
    /// The first failure cancels and aborts the remaining tasks. Cancelling
    /// `cancel` or exceeding the load timeout fails the whole load.
    pub async fn load(
        &self,
        locations: &[SourceLocation],
        cancel: &CancellationToken,
    ) -> Result<Vec<CouponSource>, LoadError> {
        if locations.len() != SOURCE_COUNT {
            return Err(LoadError::SourceCount {
                expected: SOURCE_COUNT,
                actual: locations.len(),
            });
        }

        let token = cancel.child_token();
        let mut tasks = JoinSet::new();
        for (index, location) in locations.iter().enumerate() {
            let reader = Arc::clone(&self.reader);
            let location = location.clone();
            let token = token.clone();
            let (expected, fpr) = (self.expected_entries, self.target_fpr);

            tasks.spawn(async move {
                load_source(reader.as_ref(), index, location, expected, fpr, &token).await
            });
        }

        let outcome = tokio::time::timeout(self.load_timeout, collect(&mut tasks)).await;
        // Whatever is still running is stopped here; dropping `tasks` aborts it
        token.cancel();

        match outcome {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(self.load_timeout)),
        }
    }
}

async fn collect(
    tasks: &mut JoinSet<Result<CouponSource, LoadError>>,
) -> Result<Vec<CouponSource>, LoadError> {
    let mut slots: Vec<Option<CouponSource>> = (0..SOURCE_COUNT).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let source = joined.map_err(|e| LoadError::Task(e.to_string()))??;
        let index = source.index();
        slots[index] = Some(source);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| LoadError::Task(format!("source {index} produced no result")))
        })
        .collect()
}

fn source_failure(index: usize, location: &SourceLocation, source: SourceError) -> LoadError {
    LoadError::Source {
        index,
        location: location.to_string(),
        source,
    }
}

/// Keys per batch handed to the filter builder
const KEY_BATCH: usize = 4096;

/// Batches in flight between the reading task and the filter builder
const BATCHES_IN_FLIGHT: usize = 8;

type KeyBatch = Result<Vec<Vec<u8>>, SourceError>;

/// Blocking iterator over the batches sent by the reading task
///
/// Ends when the sender is dropped; a sent error is yielded as-is so the
/// build aborts on it.
struct BatchedKeys {
    receiver: mpsc::Receiver<KeyBatch>,
    current: std::vec::IntoIter<Vec<u8>>,
}

impl Iterator for BatchedKeys {
    type Item = Result<Vec<u8>, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.current.next() {
                return Some(Ok(key));
            }
            match self.receiver.blocking_recv()? {
                Ok(batch) => self.current = batch.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

async fn load_source<R>(
    reader: &R,
    index: usize,
    location: SourceLocation,
    expected_entries: usize,
    target_fpr: f64,
    cancel: &CancellationToken,
) -> Result<CouponSource, LoadError>
where
    R: CouponSourceReader + ?Sized,
{
    let started = Instant::now();
    debug!(source = index, %location, "Loading coupon source");

    let mut records = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(LoadError::Cancelled),
        opened = reader.open(&location) => {
            opened.map_err(|e| source_failure(index, &location, e))?
        }
    };

    // Hashing runs on a blocking thread while this task keeps reading
    let (keys, receiver) = mpsc::channel(BATCHES_IN_FLIGHT);
    let builder = tokio::task::spawn_blocking(move || {
        let keys = BatchedKeys {
            receiver,
            current: Vec::new().into_iter(),
        };
        MembershipFilter::build(keys, expected_entries, target_fpr)
    });

    let mut entries = 0usize;
    let mut oversized = 0usize;
    loop {
        let mut batch = Vec::with_capacity(KEY_BATCH);
        let walk = walk_records(&mut records, cancel, |record| {
            let code = normalize_record(record);
            if !code.is_empty() {
                batch.push(code.into_owned());
            }
            if batch.len() == KEY_BATCH {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;

        let walk = match walk {
            Ok(walk) => walk,
            Err(e) => {
                // The builder hands the error back, aborting the filter
                let _ = keys.send(Err(SourceError::Io(e))).await;
                break;
            }
        };
        oversized += walk.oversized;
        if walk.end == RecordWalk::Cancelled {
            return Err(LoadError::Cancelled);
        }

        entries += batch.len();
        if !batch.is_empty() && keys.send(Ok(batch)).await.is_err() {
            // Builder is gone; its join result explains why
            break;
        }
        if walk.end == RecordWalk::Completed {
            break;
        }
    }
    drop(keys);

    let filter = builder
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
        .map_err(|e| source_failure(index, &location, e))?;

    if oversized > 0 {
        warn!(
            source = index,
            oversized,
            max_record_len = MAX_RECORD_LEN,
            "Skipped records longer than any coupon code"
        );
    }

    if entries > expected_entries {
        warn!(
            source = index,
            entries,
            expected_entries,
            degraded_fpr = calculate_fpr(filter.size_bits(), entries, filter.hash_count()),
            "Source exceeds expected entries, false positive rate degraded"
        );
    }

    info!(
        source = index,
        %location,
        entries,
        size_bytes = filter.size_bytes(),
        hash_count = filter.hash_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Coupon source loaded"
    );

    Ok(CouponSource::new(index, location, filter, entries))
}
