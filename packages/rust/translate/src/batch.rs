//! Delimiter-multiplexed batch translation.
//!
//! Many short texts are joined into one remote call and the combined result
//! is split back by the same delimiter. This amortizes per-call network and
//! rate-limit cost, which matters at tens-of-thousands-of-items scale, but
//! is inherently fragile: the service may normalize whitespace around the
//! marker or, in the worst case, drop it. The split is therefore tolerant
//! (marker-only split, trimmed parts) and every positional mismatch degrades
//! to the item's own source text.

use crate::{RetryPolicy, Translator, retry::translate_with_retry};

/// Marker separating batched texts. An asterism almost never occurs in
/// running text and passes through the translation service unchanged.
const DELIMITER_MARK: char = '⁂';

/// Full separator inserted between joined texts. Its length is the per-item
/// overhead the batcher must account for against the request ceiling.
pub const BATCH_DELIMITER: &str = "\n⁂\n";

/// Translate a batch of texts in one remote call.
///
/// On total call failure the retry layer already returns the joined source
/// string, so splitting it yields every item's own source text — the whole
/// batch degrades positionally without a special case.
pub async fn translate_batch<T: Translator>(
    translator: &T,
    texts: &[String],
    policy: &RetryPolicy,
) -> Vec<String> {
    if texts.is_empty() {
        return Vec::new();
    }

    let joined = texts.join(BATCH_DELIMITER);
    let combined = translate_with_retry(translator, &joined, policy).await;
    split_batch_response(&combined, texts)
}

/// Split a combined response back into one part per source text.
///
/// Guarantees: the output has exactly `sources.len()` entries; a missing or
/// empty part falls back to its source text; surplus parts are ignored.
/// Never indexes out of range.
pub fn split_batch_response(combined: &str, sources: &[String]) -> Vec<String> {
    let parts: Vec<&str> = combined.split(DELIMITER_MARK).map(str::trim).collect();

    sources
        .iter()
        .enumerate()
        .map(|(i, source)| match parts.get(i) {
            Some(part) if !part.is_empty() => (*part).to_string(),
            _ => source.trim().to_string(),
        })
        .collect()
}
