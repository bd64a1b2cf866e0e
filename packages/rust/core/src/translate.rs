//! Batched-sequential translation backfill pipeline.
//!
//! Single-threaded, one batch at a time: the only concurrency is the current
//! batch's remote call being in flight. After every batch the record store
//! is rewritten first and the checkpoint second, so a crash can never leave
//! a checkpoint ahead of the data it describes.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use wortschatz_shared::{Level, Result, TranslationConfig};
use wortschatz_store::{CheckpointManager, PipelineKind, RecordStore};
use wortschatz_translate::{BATCH_DELIMITER, RetryPolicy, Translator, translate_batch};

use crate::batcher;
use crate::progress::ProgressReporter;
use crate::selector;

/// Summary of a completed translation run.
#[derive(Debug)]
pub struct TranslateOutcome {
    /// Records in the level.
    pub records: usize,
    /// Pending items found at the resume position.
    pub pending: usize,
    /// Batches dispatched.
    pub batches: usize,
    /// Translation results applied (including fallbacks).
    pub items_applied: usize,
    /// Record index the run resumed from.
    pub resumed_from: usize,
    /// Whether the level ended with zero pending items (checkpoint cleared).
    pub completed: bool,
    /// Total duration of the run.
    pub elapsed: Duration,
}

/// Backfill missing translations for one level.
///
/// The checkpoint stores the first record index not yet fully covered by
/// completed batches. Items already reflected in the store are also skipped
/// naturally by the sentinel predicate; the checkpoint additionally skips
/// records whose items were *attempted* and degraded to their fallback
/// value, so a resumed run does not re-spend the retry budget on them.
#[instrument(skip_all, fields(level = %level))]
pub async fn translate_level<T: Translator>(
    level: Level,
    store: &RecordStore,
    checkpoints: &CheckpointManager,
    translator: &T,
    config: &TranslationConfig,
    progress: &dyn ProgressReporter,
) -> Result<TranslateOutcome> {
    let start = Instant::now();

    let mut records = store.load(level)?;
    let total_records = records.len();

    let resumed_from = checkpoints
        .load(level, PipelineKind::Translate)
        .min(total_records);
    if resumed_from > 0 {
        info!(resumed_from, "resuming from checkpoint");
    }

    progress.phase("Selecting pending work");
    let pending = selector::pending_items_from(&records, resumed_from);
    let pending_count = pending.len();

    let overhead = BATCH_DELIMITER.chars().count();
    let batches = batcher::pack(pending, config.batch_chars, overhead);
    let total_batches = batches.len();

    // Position to checkpoint after batch `i` completes: the first record of
    // the next batch (a record may span a batch boundary), or the level end.
    let resume_positions: Vec<usize> = (0..total_batches)
        .map(|i| {
            batches
                .get(i + 1)
                .map(|next| next[0].0.record)
                .unwrap_or(total_records)
        })
        .collect();

    info!(
        records = total_records,
        pending = pending_count,
        batches = total_batches,
        "translation backfill starting"
    );

    progress.phase("Translating batches");
    let policy = RetryPolicy::from(config);
    let mut items_applied = 0;

    for (index, batch) in batches.into_iter().enumerate() {
        let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
        let translated = translate_batch(translator, &texts, &policy).await;

        for ((item, _), value) in batch.iter().zip(translated) {
            selector::apply(&mut records, *item, value);
            items_applied += 1;
        }

        // Record store first, then checkpoint.
        store.save(level, &records)?;
        checkpoints.save(level, PipelineKind::Translate, resume_positions[index])?;

        progress.item_done(index + 1, total_batches, &format!("{} items", batch.len()));
    }

    progress.phase("Verifying completion");
    let remaining = selector::pending_items(&records).len();
    let completed = remaining == 0;

    if completed {
        checkpoints.clear(level, PipelineKind::Translate)?;
        info!(items_applied, "level fully translated, checkpoint cleared");
    } else {
        info!(
            items_applied,
            remaining, "items left at fallback values, checkpoint retained"
        );
    }

    Ok(TranslateOutcome {
        records: total_records,
        pending: pending_count,
        batches: total_batches,
        items_applied,
        resumed_from,
        completed,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wortschatz_shared::{LexicalRecord, TextPair, WortschatzError};
    use wortschatz_translate::BATCH_DELIMITER;

    use crate::progress::SilentProgress;

    /// Suffixes every delimited part with "_EN", counting remote calls.
    struct StubTranslator {
        calls: AtomicUsize,
    }

    impl StubTranslator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Translator for StubTranslator {
        async fn translate(&self, text: &str) -> wortschatz_shared::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let parts: Vec<String> = text
                .split('⁂')
                .map(|p| format!("{}_EN", p.trim()))
                .collect();
            Ok(parts.join(BATCH_DELIMITER))
        }
    }

    struct FailingTranslator;

    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str) -> wortschatz_shared::Result<String> {
            Err(WortschatzError::Network("down".into()))
        }
    }

    fn fixtures() -> (tempfile::TempDir, RecordStore, CheckpointManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::new(dir.path());
        let checkpoints = CheckpointManager::new(dir.path());
        (dir, store, checkpoints)
    }

    fn config() -> TranslationConfig {
        TranslationConfig {
            retry_delay_ms: 0,
            rate_limit_ms: 0,
            ..TranslationConfig::default()
        }
    }

    /// Three records: an untranslated primary, an untranslated synonym, and
    /// a fully translated record.
    fn scenario_records() -> Vec<LexicalRecord> {
        let mut first = LexicalRecord::new("Haus");
        first.english = "Haus".into();

        let mut second = LexicalRecord::new("gehen");
        second.english = "to go".into();
        second.synonyms.push(TextPair {
            german: "laufen".into(),
            english: String::new(),
        });

        let mut third = LexicalRecord::new("Baum");
        third.english = "tree".into();

        vec![first, second, third]
    }

    #[tokio::test(start_paused = true)]
    async fn stub_scenario_translates_pending_fields_only() {
        let (_dir, store, checkpoints) = fixtures();
        store.save(Level::A1, &scenario_records()).expect("seed");

        let translator = StubTranslator::new();
        let outcome = translate_level(
            Level::A1,
            &store,
            &checkpoints,
            &translator,
            &config(),
            &SilentProgress,
        )
        .await
        .expect("run");

        let records = store.load(Level::A1).expect("load");
        assert_eq!(records[0].english, "Haus_EN");
        assert_eq!(records[1].synonyms[0].english, "laufen_EN");
        assert_eq!(records[1].english, "to go");
        assert_eq!(records[2].english, "tree");

        assert!(outcome.completed);
        assert_eq!(outcome.items_applied, 2);
        assert!(!checkpoints.exists(Level::A1, PipelineKind::Translate));
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_is_byte_identical_and_call_free() {
        let (_dir, store, checkpoints) = fixtures();
        store.save(Level::A1, &scenario_records()).expect("seed");

        let translator = StubTranslator::new();
        translate_level(
            Level::A1,
            &store,
            &checkpoints,
            &translator,
            &config(),
            &SilentProgress,
        )
        .await
        .expect("first run");
        let after_first = std::fs::read(store.level_path(Level::A1)).expect("read");
        let calls_first = translator.calls.load(Ordering::SeqCst);

        translate_level(
            Level::A1,
            &store,
            &checkpoints,
            &translator,
            &config(),
            &SilentProgress,
        )
        .await
        .expect("second run");
        let after_second = std::fs::read(store.level_path(Level::A1)).expect("read");

        assert_eq!(after_first, after_second);
        assert_eq!(translator.calls.load(Ordering::SeqCst), calls_first);
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_leaves_sources_and_completes() {
        let (_dir, store, checkpoints) = fixtures();
        store.save(Level::B1, &scenario_records()).expect("seed");

        let outcome = translate_level(
            Level::B1,
            &store,
            &checkpoints,
            &FailingTranslator,
            &config(),
            &SilentProgress,
        )
        .await
        .expect("run completes despite failures");

        let records = store.load(Level::B1).expect("load");
        assert_eq!(records[0].english, "Haus");
        assert_eq!(records[1].synonyms[0].english, "laufen");

        // Fallback values are textually pending, so the checkpoint stays.
        assert!(!outcome.completed);
        assert!(checkpoints.exists(Level::B1, PipelineKind::Translate));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_processes_only_records_at_or_after_checkpoint() {
        let (_dir, store, checkpoints) = fixtures();

        let mut records: Vec<LexicalRecord> = ["Haus", "Baum", "Wald"]
            .iter()
            .map(|w| {
                let mut r = LexicalRecord::new(*w);
                r.english = (*w).into();
                r
            })
            .collect();

        // Interrupted earlier run: record 0 already translated and the
        // checkpoint advanced past it.
        records[0].english = "house".into();
        store.save(Level::C1, &records).expect("seed");
        checkpoints
            .save(Level::C1, PipelineKind::Translate, 1)
            .expect("seed checkpoint");

        let translator = StubTranslator::new();
        // One item per batch: every word is oversized for a 1-char ceiling.
        let config = TranslationConfig {
            batch_chars: 1,
            retry_delay_ms: 0,
            rate_limit_ms: 0,
            ..TranslationConfig::default()
        };

        let outcome = translate_level(
            Level::C1,
            &store,
            &checkpoints,
            &translator,
            &config,
            &SilentProgress,
        )
        .await
        .expect("resume run");

        assert_eq!(outcome.resumed_from, 1);
        assert_eq!(outcome.items_applied, 2);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);

        let records = store.load(Level::C1).expect("load");
        assert_eq!(records[0].english, "house");
        assert_eq!(records[1].english, "Baum_EN");
        assert_eq!(records[2].english, "Wald_EN");

        // Interrupted prefix (1 item) + resumed run (2 items) equals the
        // 3 items an uninterrupted run would have applied.
        assert!(outcome.completed);
        assert!(!checkpoints.exists(Level::C1, PipelineKind::Translate));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_level_file_aborts_the_run() {
        let (_dir, store, checkpoints) = fixtures();
        let err = translate_level(
            Level::C2,
            &store,
            &checkpoints,
            &StubTranslator::new(),
            &config(),
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WortschatzError::Store(_)));
    }
}
