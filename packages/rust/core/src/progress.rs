//! Progress reporting for pipeline runs.

/// Progress callback for reporting pipeline status. The CLI backs this with
/// indicatif bars; tests and headless runs use [`SilentProgress`].
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a unit of work (batch, word, round) completes.
    fn item_done(&self, current: usize, total: usize, detail: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_done(&self, _current: usize, _total: usize, _detail: &str) {}
}
