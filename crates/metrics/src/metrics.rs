//! Rank-based relevance metrics for a single topic.
//!
//! Every function takes the retrieved document ids in rank order. Binary
//! metrics take the set of relevant ids (grade > 0); NDCG takes the graded
//! judgments for the topic.
//!
//! A document id repeated in `retrieved` only counts at its first position.
//! Cutoffs of 0 yield 0.0.

use std::collections::{HashMap, HashSet};

#[inline]
fn usize_to_f64(value: usize) -> f64 {
    u32::try_from(value).map_or_else(|_| f64::from(u32::MAX), f64::from)
}

/// Positions (0-based) of first occurrences of relevant documents within
/// the first `limit` entries.
fn relevant_hits<'a>(
    retrieved: &'a [&'a str],
    relevant: &'a HashSet<&'a str>,
    limit: usize,
) -> impl Iterator<Item = usize> + 'a {
    let mut seen = HashSet::new();
    retrieved
        .iter()
        .take(limit)
        .enumerate()
        .filter(move |(_, doc)| seen.insert(**doc) && relevant.contains(**doc))
        .map(|(i, _)| i)
}

/// Precision at k.
///
/// `|top-k ∩ relevant| / k`. The denominator is always `k`, so missing
/// slots in a short list count as non-relevant.
#[must_use]
pub fn precision_at_k(retrieved: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = relevant_hits(retrieved, relevant, k).count();
    usize_to_f64(hits) / usize_to_f64(k)
}

/// Recall at k.
///
/// `|top-k ∩ relevant| / |relevant|`, 0.0 when nothing is relevant.
#[must_use]
pub fn recall_at_k(retrieved: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }
    let hits = relevant_hits(retrieved, relevant, k).count();
    usize_to_f64(hits) / usize_to_f64(relevant.len())
}

/// Average precision over the whole ranking.
///
/// Precision is accumulated at each rank holding a relevant document, then
/// divided by the number of relevant documents. 0.0 when nothing is relevant.
#[must_use]
pub fn average_precision(retrieved: &[&str], relevant: &HashSet<&str>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let sum: f64 = relevant_hits(retrieved, relevant, retrieved.len())
        .enumerate()
        .map(|(found, i)| usize_to_f64(found + 1) / usize_to_f64(i + 1))
        .sum();
    sum / usize_to_f64(relevant.len())
}

/// Reciprocal of the rank of the first relevant document, 0.0 if none.
#[must_use]
pub fn reciprocal_rank(retrieved: &[&str], relevant: &HashSet<&str>) -> f64 {
    relevant_hits(retrieved, relevant, retrieved.len())
        .next()
        .map_or(0.0, |i| 1.0 / usize_to_f64(i + 1))
}

/// Exponential gain `2^grade - 1`
#[inline]
#[must_use]
pub fn gain(grade: u32) -> f64 {
    f64::from(grade).exp2() - 1.0
}

/// Position discount for 0-based position `i` (rank `i + 1`): `log2(i + 2)`
#[inline]
fn discount(i: usize) -> f64 {
    (usize_to_f64(i) + 2.0).log2()
}

/// Discounted cumulative gain of grades placed at ranks 1..
///
/// Overflows to infinity once a grade reaches 1024; [`ndcg_at_k`] uses the
/// scaled form instead.
#[must_use]
pub fn dcg(grades: &[u32]) -> f64 {
    grades
        .iter()
        .enumerate()
        .map(|(i, &g)| gain(g) / discount(i))
        .sum()
}

/// `gain(grade) * 2^-top`, finite for every `grade <= top`
#[inline]
fn scaled_gain(grade: u32, top: u32) -> f64 {
    (f64::from(grade) - f64::from(top)).exp2() - (-f64::from(top)).exp2()
}

/// DCG scaled by `2^-top`
fn scaled_dcg(grades: &[u32], top: u32) -> f64 {
    grades
        .iter()
        .enumerate()
        .map(|(i, &g)| scaled_gain(g, top) / discount(i))
        .sum()
}

/// Normalized discounted cumulative gain at k with graded relevance.
///
/// `DCG@k / IDCG@k`, where the ideal ranking places the judged grades in
/// descending order. Unjudged documents have grade 0. Returns 0.0 when the
/// ideal DCG is 0 (no relevant documents judged).
#[must_use]
pub fn ndcg_at_k(retrieved: &[&str], judgments: &HashMap<String, u32>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let mut seen = HashSet::new();
    let actual: Vec<u32> = retrieved
        .iter()
        .take(k)
        .map(|doc| {
            if seen.insert(*doc) {
                judgments.get(*doc).copied().unwrap_or(0)
            } else {
                0
            }
        })
        .collect();

    let mut ideal: Vec<u32> = judgments.values().copied().filter(|&g| g > 0).collect();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    ideal.truncate(k);

    // Both sums are scaled by 2^-top so large grades cannot overflow.
    let Some(&top) = ideal.first() else {
        return 0.0;
    };
    let idcg = scaled_dcg(&ideal, top);
    if idcg <= 0.0 {
        return 0.0;
    }
    (scaled_dcg(&actual, top) / idcg).clamp(0.0, 1.0)
}
