//! Per-topic min-max score normalization
//!
//! Rescales the scores of one topic in one run into `[0, 1]`:
//! `(score - min) / (max - min)`. When every score in the topic is the same
//! there is no range to scale by, and every entry gets 0.0.

use clir_core::{RankedResultSet, ResultEntry};

/// Relative threshold for treating a topic's score range as zero.
///
/// The range counts as zero when it is at most this fraction of the largest
/// score magnitude, so tiny but distinct scores still normalize.
pub const SCORE_RANGE_EPSILON: f64 = 1e-12;

/// Minimum and maximum of a score sequence, `None` when empty.
///
/// Single pass; NaN values are ignored.
pub fn min_max<I>(scores: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    scores
        .into_iter()
        .filter(|s| !s.is_nan())
        .fold(None, |acc, s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
}

/// Min-max normalize a slice of scores, preserving order
pub fn normalize_scores(scores: &[f64]) -> Vec<f64> {
    let Some((lo, hi)) = min_max(scores.iter().copied()) else {
        return Vec::new();
    };
    let range = hi - lo;
    if range <= SCORE_RANGE_EPSILON * lo.abs().max(hi.abs()) {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| (s - lo) / range).collect()
}

/// Normalized scores for one topic's entries, in rank order
pub fn normalize_topic(entries: &[ResultEntry]) -> Vec<f64> {
    let raw: Vec<f64> = entries.iter().map(|e| e.score).collect();
    normalize_scores(&raw)
}

/// Copy of `run` with every topic's scores min-max normalized.
///
/// Ranks and document order are unchanged; normalization is monotone.
pub fn normalize_run(run: &RankedResultSet) -> RankedResultSet {
    let mut out = RankedResultSet::new(run.tag());
    for (topic_id, entries) in run.topics() {
        let normalized = normalize_topic(entries);
        let ordered = entries
            .iter()
            .zip(normalized)
            .map(|(e, s)| (e.doc_id.clone(), s))
            .collect();
        out.insert_ordered(topic_id, ordered);
    }
    out
}
