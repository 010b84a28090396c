//! Near-duplicate suppression for search results
//!
//! Two items are near-duplicates when the Jaccard similarity of their
//! tokenised `title + snippet` word sets exceeds the configured threshold.
//! Collapsing keeps the first item seen, so deduplication is stable and
//! idempotent.

use crate::types::ResultItem;
use std::collections::HashSet;

/// Default similarity above which two items count as the same result.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.8;

fn word_set(item: &ResultItem) -> HashSet<String> {
    item.title
        .split(|c: char| !c.is_alphanumeric())
        .chain(item.snippet.split(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of two word sets. Two empty sets share nothing.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

pub fn similarity(a: &ResultItem, b: &ResultItem) -> f64 {
    jaccard(&word_set(a), &word_set(b))
}

/// Drop every item that is a near-duplicate of an earlier kept item.
pub fn dedup(items: Vec<ResultItem>, threshold: f64) -> Vec<ResultItem> {
    let mut kept: Vec<(ResultItem, HashSet<String>)> = Vec::with_capacity(items.len());

    for item in items {
        let words = word_set(&item);
        let duplicate = kept
            .iter()
            .any(|(_, seen)| jaccard(&words, seen) > threshold);
        if !duplicate {
            kept.push((item, words));
        }
    }

    kept.into_iter().map(|(item, _)| item).collect()
}
