//! Bounded-concurrency composition re-extraction pipeline.
//!
//! Refreshes `composition` / `decompositionMeaning` from the dictionary's
//! Wortzerlegung sections without touching any other field. Pages are
//! fetched concurrently within one round (a fixed-size task pool), but all
//! result application funnels back onto the orchestrating task — the single
//! writer — before the store rewrite and checkpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use wortschatz_shared::{Level, Result};
use wortschatz_store::{CheckpointManager, PipelineKind, RecordStore};

use crate::progress::ProgressReporter;
use wortschatz_scrape::{WordFetcher, morph};

/// Tunables for one re-extraction run.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Records fetched per round (one store rewrite + checkpoint per round).
    pub batch_size: usize,
    /// Concurrent fetches within a round.
    pub workers: usize,
    /// Per-fetch delay, applied inside the concurrency permit.
    pub rate_limit: Duration,
}

/// Summary of a completed re-extraction run.
#[derive(Debug)]
pub struct ComposeOutcome {
    /// Records in the level.
    pub records: usize,
    /// Records whose decomposition was updated from the page.
    pub updated: usize,
    /// Record index the run resumed from.
    pub resumed_from: usize,
    /// Total duration of the run.
    pub elapsed: Duration,
}

/// Re-extract word decomposition for one level.
#[instrument(skip_all, fields(level = %level))]
pub async fn recompose_level<F: WordFetcher>(
    level: Level,
    store: &RecordStore,
    checkpoints: &CheckpointManager,
    fetcher: Arc<F>,
    options: &ComposeOptions,
    progress: &dyn ProgressReporter,
) -> Result<ComposeOutcome> {
    let started = Instant::now();

    let mut records = store.load(level)?;
    let total = records.len();

    let resumed_from = checkpoints.load(level, PipelineKind::Compose).min(total);
    if resumed_from > 0 {
        info!(resumed_from, "resuming from checkpoint");
    }

    let batch_size = options.batch_size.max(1);
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let mut updated = 0;

    progress.phase("Re-extracting word decomposition");
    let mut start = resumed_from;
    while start < total {
        let end = (start + batch_size).min(total);

        let mut handles = Vec::new();
        for index in start..end {
            let word = records[index].word.clone();
            let fetcher = Arc::clone(&fetcher);
            let semaphore = Arc::clone(&semaphore);
            let rate_limit = options.rate_limit;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                if !rate_limit.is_zero() {
                    tokio::time::sleep(rate_limit).await;
                }
                (index, fetcher.fetch_entry(&word).await)
            }));
        }

        // Results are applied here only — workers never write.
        for handle in handles {
            match handle.await {
                Ok((index, Ok(Some(page)))) if !page.composition.is_empty() => {
                    records[index].decomposition_meaning = page
                        .composition
                        .iter()
                        .map(|part| morph::classify_part(part))
                        .collect();
                    records[index].composition = page.composition;
                    updated += 1;
                }
                Ok((_, Ok(_))) => {
                    // No page or no Wortzerlegung section: the typed record
                    // already carries empty defaults, nothing to write.
                }
                Ok((index, Err(e))) => {
                    warn!(word = %records[index].word, error = %e, "decomposition fetch failed");
                }
                Err(e) => {
                    warn!(error = %e, "decomposition task failed");
                }
            }
        }

        // Record store first, then checkpoint.
        store.save(level, &records)?;
        checkpoints.save(level, PipelineKind::Compose, end)?;
        progress.item_done(end, total, "records recomposed");

        start = end;
    }

    checkpoints.clear(level, PipelineKind::Compose)?;

    let outcome = ComposeOutcome {
        records: total,
        updated,
        resumed_from,
        elapsed: started.elapsed(),
    };

    info!(
        updated = outcome.updated,
        records = outcome.records,
        elapsed_ms = outcome.elapsed.as_millis(),
        "composition re-extraction complete"
    );

    Ok(outcome)
}
