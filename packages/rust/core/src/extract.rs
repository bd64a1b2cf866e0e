//! Process-parallel bulk extraction pipeline.
//!
//! The level's word list is split into contiguous shards, one independent
//! worker per shard. Workers own their slice, return a value, and never
//! touch the output file; the merge after the join barrier is the only
//! synchronization point, and the orchestrating task is the single writer.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use percent_encoding::percent_decode_str;
use tracing::{debug, info, instrument, warn};

use wortschatz_shared::{BaseEntry, Level, LexicalRecord, Result, TextPair};
use wortschatz_store::{CheckpointManager, PipelineKind, RecordStore, load_base_entries};

use crate::progress::ProgressReporter;
use wortschatz_scrape::{DwdsEntry, WordFetcher, canonicalize_lemma, morph};

// ---------------------------------------------------------------------------
// Options & outcome
// ---------------------------------------------------------------------------

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Worker (shard) count.
    pub workers: usize,
    /// Explicit start index into the base word list; `None` resumes from the
    /// checkpoint.
    pub start_from: Option<usize>,
    /// Cap on how many words this run attempts.
    pub max_words: Option<usize>,
    /// Per-word delay inside each worker.
    pub rate_limit: Duration,
}

/// Summary of a completed extraction run.
#[derive(Debug)]
pub struct ExtractOutcome {
    /// Words in the base list.
    pub total_words: usize,
    /// Words attempted this run.
    pub attempted: usize,
    /// Records extracted and appended.
    pub extracted: usize,
    /// Words skipped (not found or failed after retries).
    pub failed: usize,
    /// Whether the whole base list has now been attempted.
    pub completed: bool,
    /// Total duration of the run.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Sharding
// ---------------------------------------------------------------------------

/// Contiguous shard bounds: `floor(len / workers)` words each, the last
/// shard absorbing the remainder. Worker count is clamped so no shard is
/// empty.
pub fn shard_bounds(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, len);
    let chunk = len / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 { len } else { start + chunk };
            start..end
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Extract dictionary data for one level's base word list and append the
/// resulting records to the level's store file.
#[instrument(skip_all, fields(level = %level))]
pub async fn extract_level<F: WordFetcher>(
    level: Level,
    base_dir: &Path,
    store: &RecordStore,
    checkpoints: &CheckpointManager,
    fetcher: Arc<F>,
    options: &ExtractOptions,
    progress: &dyn ProgressReporter,
) -> Result<ExtractOutcome> {
    let started = Instant::now();

    let entries = load_base_entries(base_dir, level)?;
    let total_words = entries.len();

    let start = options
        .start_from
        .unwrap_or_else(|| checkpoints.load(level, PipelineKind::Extract))
        .min(total_words);
    let end = match options.max_words {
        Some(max) => (start + max).min(total_words),
        None => total_words,
    };
    let slice = &entries[start..end];

    info!(
        total_words,
        start,
        attempting = slice.len(),
        workers = options.workers,
        "bulk extraction starting"
    );

    progress.phase("Scraping dictionary pages");
    let mut handles = Vec::new();
    for (worker_id, range) in shard_bounds(slice.len(), options.workers).into_iter().enumerate() {
        let chunk: Vec<BaseEntry> = slice[range].to_vec();
        let fetcher = Arc::clone(&fetcher);
        let rate_limit = options.rate_limit;

        handles.push(tokio::spawn(async move {
            extract_shard(worker_id, chunk, fetcher, rate_limit).await
        }));
    }

    // Join barrier: collect every worker's result list in shard order.
    let mut extracted: Vec<LexicalRecord> = Vec::new();
    let mut failed = 0;
    let shard_count = handles.len();
    for (worker_id, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(shard) => {
                failed += shard.failed;
                extracted.extend(shard.records);
            }
            Err(e) => {
                // A crashed worker loses its shard's remainder; the rest of
                // the pool is unaffected.
                warn!(worker_id, error = %e, "worker crashed, shard results lost");
            }
        }
        progress.item_done(worker_id + 1, shard_count, "workers joined");
    }

    progress.phase("Merging results");
    let extracted_count = extracted.len();

    // Single-writer merge on the orchestrating task.
    let mut records = store.load_or_default(level)?;
    records.extend(extracted);
    store.save(level, &records)?;

    let completed = end >= total_words;
    if completed {
        checkpoints.clear(level, PipelineKind::Extract)?;
    } else {
        checkpoints.save(level, PipelineKind::Extract, end)?;
    }

    let outcome = ExtractOutcome {
        total_words,
        attempted: slice.len(),
        extracted: extracted_count,
        failed,
        completed,
        elapsed: started.elapsed(),
    };

    info!(
        extracted = outcome.extracted,
        failed = outcome.failed,
        total = records.len(),
        elapsed_ms = outcome.elapsed.as_millis(),
        "bulk extraction complete"
    );

    Ok(outcome)
}

/// Result of one worker's shard.
struct ShardResult {
    records: Vec<LexicalRecord>,
    failed: usize,
}

/// Process one shard strictly in order. Per-word failures are caught and
/// skipped here so one bad word never aborts the shard.
async fn extract_shard<F: WordFetcher>(
    worker_id: usize,
    entries: Vec<BaseEntry>,
    fetcher: Arc<F>,
    rate_limit: Duration,
) -> ShardResult {
    let total = entries.len();
    let mut records = Vec::new();
    let mut failed = 0;

    for (index, entry) in entries.iter().enumerate() {
        match fetcher.fetch_entry(&entry.lemma).await {
            Ok(Some(page)) => records.push(build_record(entry, page)),
            Ok(None) => {
                debug!(worker_id, lemma = %entry.lemma, "no entry, skipping");
                failed += 1;
            }
            Err(e) => {
                warn!(worker_id, lemma = %entry.lemma, error = %e, "extraction failed, skipping");
                failed += 1;
            }
        }

        if (index + 1) % 20 == 0 {
            debug!(worker_id, done = index + 1, total, "shard progress");
        }

        if !rate_limit.is_zero() {
            tokio::time::sleep(rate_limit).await;
        }
    }

    info!(worker_id, extracted = records.len(), total, "worker finished");
    ShardResult { records, failed }
}

/// Build a lexical record from a base entry and its scraped page data.
///
/// The primary translation is seeded with the word itself — the sentinel
/// form the translation backfill selects on later.
fn build_record(entry: &BaseEntry, page: DwdsEntry) -> LexicalRecord {
    let word = canonicalize_lemma(&entry.lemma);

    let (composition, decomposition_meaning) = if page.composition.is_empty() {
        morph::heuristic_composition(&word)
    } else {
        let meanings = page
            .composition
            .iter()
            .map(|part| morph::classify_part(part))
            .collect();
        (page.composition, meanings)
    };

    let mut record = LexicalRecord::new(word.clone());
    record.part_of_speech = entry
        .word_class
        .as_deref()
        .map(morph::map_part_of_speech)
        .unwrap_or_else(|| "unknown".into());
    record.english = word.clone();
    record.composition = composition;
    record.decomposition_meaning = decomposition_meaning;
    record.frequency = page.frequency;
    record.synonyms = page
        .related_words
        .into_iter()
        .map(TextPair::untranslated)
        .collect();
    record.examples = page.examples.into_iter().map(TextPair::untranslated).collect();
    record.etymology = page.etymology;
    record.compounds = page.compounds;
    record.source_url = entry
        .url
        .as_deref()
        .map(|url| percent_decode_str(url).decode_utf8_lossy().into_owned());

    record
}
