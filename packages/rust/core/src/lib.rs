//! Pipeline orchestration for the wortschatz vocabulary dataset.
//!
//! This crate ties the record store, the translation and scraping
//! collaborators, and the checkpoint manager into the three end-to-end
//! pipelines:
//! - [`translate::translate_level`] — batched-sequential translation backfill
//! - [`extract::extract_level`] — process-parallel bulk extraction
//! - [`compose::recompose_level`] — bounded-concurrency composition
//!   re-extraction
//!
//! The work selector and batcher underneath them carry the real invariants:
//! idempotence, at-most-duplicate-work-once, and crash consistency.

pub mod batcher;
pub mod compose;
pub mod extract;
pub mod progress;
pub mod selector;
pub mod translate;

pub use progress::{ProgressReporter, SilentProgress};
