//! Batcher — partition ordered work into size-bounded chunks.
//!
//! Remote translation APIs impose a hard request-size ceiling; multiplexing
//! many short items into one call amortizes per-call network and rate-limit
//! cost, which matters at tens-of-thousands-of-items scale.

/// Partition `(item, text)` pairs into batches whose cumulative size —
/// `chars(text) + overhead` per item — stays within `max_chars`.
///
/// Guarantees:
/// - every item lands in exactly one batch,
/// - batch order and within-batch order match input order,
/// - a batch only exceeds the ceiling when it holds exactly one oversized
///   item (no item is ever dropped for being too large),
/// - no empty batch is produced from non-empty input.
///
/// Packing is greedy, so any batch-boundary suffix of the input repacks into
/// exactly the batches the full input produced for it — resume after an
/// interrupt sees the same chunking.
pub fn pack<T>(
    items: Vec<(T, String)>,
    max_chars: usize,
    overhead: usize,
) -> Vec<Vec<(T, String)>> {
    let mut batches = Vec::new();
    let mut current: Vec<(T, String)> = Vec::new();
    let mut current_size = 0usize;

    for (item, text) in items {
        let cost = text.chars().count() + overhead;

        if !current.is_empty() && current_size + cost > max_chars {
            batches.push(std::mem::take(&mut current));
            current_size = 0;
        }

        current_size += cost;
        current.push((item, text));
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
