//! Checkpoint manager — resume state for interrupted pipeline runs.
//!
//! One abstraction with one contract, reused by every pipeline variant, so
//! the translation and scraping paths cannot drift apart in their resume
//! semantics. A checkpoint is a single integer: the last fully processed
//! position for a (level, pipeline) pair, stored in a dot-prefixed side file
//! next to the record files.
//!
//! Ordering contract: `save` must only be called after the record store
//! rewrite for that position has durably completed. `clear` must only be
//! called once the work selector reports the level finished.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wortschatz_shared::{Level, Result, WortschatzError};

// ---------------------------------------------------------------------------
// PipelineKind
// ---------------------------------------------------------------------------

/// Which pipeline a checkpoint belongs to. Each kind has its own side file
/// per level; the pipelines define what the position indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Translation backfill; position is a record index.
    Translate,
    /// Bulk extraction; position is an index into the base word list.
    Extract,
    /// Composition re-extraction; position is a record index.
    Compose,
}

impl PipelineKind {
    /// File-name component for this pipeline's checkpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Translate => "translate",
            PipelineKind::Extract => "extract",
            PipelineKind::Compose => "compose",
        }
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// On-disk checkpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last fully processed position (exclusive; processing resumes here).
    pub last_position: usize,
    /// When the checkpoint was written — operator information only.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CheckpointManager
// ---------------------------------------------------------------------------

/// Reads and writes per-(level, pipeline) checkpoint files.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    root: PathBuf,
}

impl CheckpointManager {
    /// Create a manager storing checkpoints under `root` (conventionally the
    /// record store directory).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the checkpoint file for a (level, pipeline) pair.
    pub fn path(&self, level: Level, kind: PipelineKind) -> PathBuf {
        self.root
            .join(format!(".{}_progress_{level}.json", kind.as_str()))
    }

    /// Load the resume position. An absent file means "start from zero"; an
    /// unreadable one is treated the same (the sentinel predicate on the
    /// records keeps a from-zero run correct, just slower).
    pub fn load(&self, level: Level, kind: PipelineKind) -> usize {
        let path = self.path(level, kind);
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Checkpoint>(&content) {
                Ok(checkpoint) => checkpoint.last_position,
                Err(e) => {
                    tracing::warn!(?path, error = %e, "unreadable checkpoint, starting from zero");
                    0
                }
            },
            Err(_) => 0,
        }
    }

    /// Persist `position` as the last fully processed position.
    pub fn save(&self, level: Level, kind: PipelineKind, position: usize) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| WortschatzError::io(&self.root, e))?;

        let checkpoint = Checkpoint {
            last_position: position,
            updated_at: Utc::now(),
        };
        let path = self.path(level, kind);
        let json = serde_json::to_string(&checkpoint)
            .map_err(|e| WortschatzError::Store(format!("serialize checkpoint: {e}")))?;
        std::fs::write(&path, json).map_err(|e| WortschatzError::io(&path, e))?;

        tracing::debug!(level = %level, kind = kind.as_str(), position, "checkpoint saved");
        Ok(())
    }

    /// Remove the checkpoint after full-level completion. Removing an absent
    /// file is not an error.
    pub fn clear(&self, level: Level, kind: PipelineKind) -> Result<()> {
        let path = self.path(level, kind);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(level = %level, kind = kind.as_str(), "checkpoint cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WortschatzError::io(&path, e)),
        }
    }

    /// Whether a checkpoint file exists for the pair.
    pub fn exists(&self, level: Level, kind: PipelineKind) -> bool {
        self.path(level, kind).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_in_tempdir() -> (tempfile::TempDir, CheckpointManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = CheckpointManager::new(dir.path());
        (dir, manager)
    }

    #[test]
    fn absent_checkpoint_means_zero() {
        let (_dir, manager) = manager_in_tempdir();
        assert_eq!(manager.load(Level::A1, PipelineKind::Translate), 0);
        assert!(!manager.exists(Level::A1, PipelineKind::Translate));
    }

    #[test]
    fn save_load_clear_lifecycle() {
        let (_dir, manager) = manager_in_tempdir();

        manager
            .save(Level::B1, PipelineKind::Translate, 120)
            .expect("save");
        assert_eq!(manager.load(Level::B1, PipelineKind::Translate), 120);
        assert!(manager.exists(Level::B1, PipelineKind::Translate));

        manager
            .clear(Level::B1, PipelineKind::Translate)
            .expect("clear");
        assert_eq!(manager.load(Level::B1, PipelineKind::Translate), 0);

        // Clearing twice is fine.
        manager
            .clear(Level::B1, PipelineKind::Translate)
            .expect("clear again");
    }

    #[test]
    fn pipelines_do_not_share_checkpoints() {
        let (_dir, manager) = manager_in_tempdir();

        manager
            .save(Level::A2, PipelineKind::Extract, 400)
            .expect("save extract");
        manager
            .save(Level::A2, PipelineKind::Compose, 30)
            .expect("save compose");

        assert_eq!(manager.load(Level::A2, PipelineKind::Extract), 400);
        assert_eq!(manager.load(Level::A2, PipelineKind::Compose), 30);
        assert_eq!(manager.load(Level::A2, PipelineKind::Translate), 0);
    }

    #[test]
    fn corrupt_checkpoint_degrades_to_zero() {
        let (_dir, manager) = manager_in_tempdir();
        let path = manager.path(Level::C1, PipelineKind::Translate);
        std::fs::write(&path, "{not json").expect("write garbage");
        assert_eq!(manager.load(Level::C1, PipelineKind::Translate), 0);
    }
}
