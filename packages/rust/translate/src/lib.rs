//! Translation collaborator boundary.
//!
//! The [`Translator`] trait is the seam between the pipelines and the remote
//! machine-translation service: an explicitly constructed handle, injected
//! per pipeline invocation, so tests substitute a stub and no hidden session
//! state leaks across runs.
//!
//! Everything above the trait is failure policy, not transport: bounded
//! retry with fallback-to-source ([`retry`]) and delimiter-multiplexed batch
//! calls with positional fallback ([`batch`]). Neither ever lets a remote
//! failure escape — degraded values are the contract.

mod batch;
mod google;
mod retry;

use std::future::Future;

use wortschatz_shared::Result;

pub use batch::{BATCH_DELIMITER, split_batch_response, translate_batch};
pub use google::GoogleTranslator;
pub use retry::{RetryPolicy, translate_with_retry};

/// A handle to the remote translation service.
///
/// `translate` performs exactly one remote call attempt; retry, rate-limit
/// pacing, and fallback live in [`translate_with_retry`] so every
/// implementation (including test stubs) gets identical failure semantics.
pub trait Translator: Send + Sync {
    /// Translate one source-language text. An `Err` is a single failed
    /// attempt, to be retried or degraded by the caller.
    fn translate(&self, text: &str) -> impl Future<Output = Result<String>> + Send;
}
