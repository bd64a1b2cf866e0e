//! Bounded retry with fallback-to-source for single translation calls.

use std::time::Duration;

use tracing::warn;

use wortschatz_shared::TranslationConfig;

use crate::Translator;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Retry and pacing parameters for remote translation calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per call before degrading to the source value.
    pub max_retries: u32,
    /// Fixed delay after a failed attempt.
    pub retry_delay: Duration,
    /// Fixed delay after every successful call. A cost model for the remote
    /// service's implicit rate limit, not a correctness requirement.
    pub rate_limit_delay: Duration,
}

impl From<&TranslationConfig> for RetryPolicy {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            rate_limit_delay: Duration::from_millis(config.rate_limit_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Retrying call
// ---------------------------------------------------------------------------

/// Translate one text with bounded retry.
///
/// After `max_retries` failed attempts the original source text is returned —
/// a remote failure never propagates past this boundary, and the sentinel
/// predicate keeps the item re-derivably "pending" for a later run.
pub async fn translate_with_retry<T: Translator>(
    translator: &T,
    text: &str,
    policy: &RetryPolicy,
) -> String {
    let clean = text.trim();
    if clean.is_empty() {
        return String::new();
    }

    for attempt in 1..=policy.max_retries {
        match translator.translate(clean).await {
            Ok(result) => {
                tokio::time::sleep(policy.rate_limit_delay).await;
                return result;
            }
            Err(e) => {
                warn!(attempt, max = policy.max_retries, error = %e, "translation attempt failed");
                if attempt < policy.max_retries {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
        }
    }

    clean.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wortschatz_shared::{Result, WortschatzError};

    /// Fails the first `failures` calls, then succeeds with "<text>_EN".
    struct FlakyTranslator {
        failures: u32,
        calls: AtomicU32,
    }

    impl Translator for FlakyTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(WortschatzError::Network("connection reset".into()))
            } else {
                Ok(format!("{text}_EN"))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try() {
        let translator = FlakyTranslator {
            failures: 0,
            calls: AtomicU32::new(0),
        };
        let result = translate_with_retry(&translator, "Haus", &RetryPolicy::default()).await;
        assert_eq!(result, "Haus_EN");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds() {
        let translator = FlakyTranslator {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = translate_with_retry(&translator, "Baum", &RetryPolicy::default()).await;
        assert_eq!(result, "Baum_EN");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_falls_back_to_source() {
        let translator = FlakyTranslator {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let result = translate_with_retry(&translator, "  Wald  ", &RetryPolicy::default()).await;
        assert_eq!(result, "Wald");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_short_circuits() {
        let translator = FlakyTranslator {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let result = translate_with_retry(&translator, "   ", &RetryPolicy::default()).await;
        assert_eq!(result, "");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }
}
