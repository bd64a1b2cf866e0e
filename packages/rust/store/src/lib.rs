//! On-disk record store for per-level vocabulary files.
//!
//! Each level owns one JSON document (`<level>.json`): a list of
//! [`LexicalRecord`] mappings, human-readable indentation, non-ASCII
//! characters verbatim. The whole file is loaded into memory, mutated in
//! place by the pipelines, and rewritten wholesale on each checkpoint.
//!
//! **Access rules:**
//! - Writes go through [`RecordStore::save`], which is atomic (temp file in
//!   the same directory, fsync, rename) — a crash can never leave a level
//!   file half-written.
//! - Only the orchestrating task writes; workers return values and never
//!   touch the files.

mod checkpoint;

use std::io::Write;
use std::path::{Path, PathBuf};

use wortschatz_shared::{BaseEntry, Level, LexicalRecord, Result, WortschatzError};

pub use checkpoint::{Checkpoint, CheckpointManager, PipelineKind};

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Handle to the directory holding per-level record files.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a level's record file.
    pub fn level_path(&self, level: Level) -> PathBuf {
        self.root.join(format!("{level}.json"))
    }

    /// Load a level's records. A missing file is an unrecoverable error for
    /// that level: the caller aborts the level's run (other levels in a
    /// multi-level run continue independently).
    pub fn load(&self, level: Level) -> Result<Vec<LexicalRecord>> {
        let path = self.level_path(level);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            WortschatzError::Store(format!("cannot read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            WortschatzError::Store(format!("invalid record file {}: {e}", path.display()))
        })
    }

    /// Load a level's records, treating a missing file as an empty level.
    /// Used by extraction, which creates the file on its first save.
    pub fn load_or_default(&self, level: Level) -> Result<Vec<LexicalRecord>> {
        if self.level_path(level).exists() {
            self.load(level)
        } else {
            Ok(Vec::new())
        }
    }

    /// Rewrite a level's record file atomically.
    ///
    /// The content is written to a temp file in the store directory, synced,
    /// then renamed over the target, so readers (and a resumed run) observe
    /// either the old or the new complete document. Checkpoints referring to
    /// this save must only be written after this returns.
    pub fn save(&self, level: Level, records: &[LexicalRecord]) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| WortschatzError::io(&self.root, e))?;

        let path = self.level_path(level);
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| WortschatzError::Store(format!("serialize {level} records: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| WortschatzError::io(&self.root, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| WortschatzError::io(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| WortschatzError::io(&path, e.error))?;

        tracing::debug!(level = %level, records = records.len(), "record store saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Base lemma files
// ---------------------------------------------------------------------------

/// Load a level's base lemma entries (the classified lemma database), keeping
/// only real words — affix and symbol entries are dropped up front.
pub fn load_base_entries(base_dir: &Path, level: Level) -> Result<Vec<BaseEntry>> {
    let path = base_dir.join(format!("{level}.json"));
    let content = std::fs::read_to_string(&path)
        .map_err(|e| WortschatzError::Store(format!("cannot read {}: {e}", path.display())))?;

    let entries: Vec<BaseEntry> = serde_json::from_str(&content).map_err(|e| {
        WortschatzError::Store(format!("invalid base file {}: {e}", path.display()))
    })?;

    let total = entries.len();
    let words: Vec<BaseEntry> = entries.into_iter().filter(BaseEntry::is_word).collect();
    tracing::debug!(level = %level, total, words = words.len(), "base entries loaded");

    Ok(words)
}
