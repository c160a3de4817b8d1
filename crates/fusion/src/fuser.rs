//! Fusion of two ranked runs into one
//!
//! This module provides:
//! - Fuser trait for pluggable fusion algorithms
//! - LinearFuser: weighted sum of per-topic min-max normalized scores
//! - RrfFuser: Reciprocal Rank Fusion over the two runs' ranks
//!
//! Both fusers take the outer join of the two runs: a document retrieved by
//! only one run contributes nothing from the other. Topics are the union of
//! both runs' topics.
//!
//! Ties in the fused score are broken by first-encounter order: documents of
//! run A in rank order, then documents that only run B retrieved, in B's rank
//! order. The output is therefore fully deterministic.

use crate::normalize::normalize_topic;
use clir_core::logging::targets;
use clir_core::{ClirError, ClirResult, FusionMethod, FusionSection, RankedResultSet, ResultEntry};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Tag given to fused runs unless overridden
pub const DEFAULT_FUSED_TAG: &str = "Hybrid";

/// Default RRF smoothing constant
pub const DEFAULT_RRF_K: u32 = 60;

// ============================================================================
// Fuser Trait
// ============================================================================

/// Pluggable fusion interface
///
/// # Thread Safety
///
/// Fusers must be Send + Sync so one instance can be shared across
/// experiment workers.
pub trait Fuser: Send + Sync {
    /// Fuse run A and run B into a new ranked result set
    fn fuse(&self, run_a: &RankedResultSet, run_b: &RankedResultSet)
        -> ClirResult<RankedResultSet>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Check a linear fusion weight
pub fn validate_alpha(alpha: f64) -> ClirResult<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(ClirError::InvalidWeight { alpha })
    }
}

// ============================================================================
// Candidate accumulation
// ============================================================================

/// Per-document contributions from both runs, kept in first-encounter order
#[derive(Debug, Default)]
struct Candidates {
    order: Vec<String>,
    index: HashMap<String, usize>,
    from_a: Vec<f64>,
    from_b: Vec<f64>,
}

impl Candidates {
    fn slot(&mut self, doc_id: &str) -> usize {
        if let Some(&i) = self.index.get(doc_id) {
            return i;
        }
        let i = self.order.len();
        self.order.push(doc_id.to_string());
        self.index.insert(doc_id.to_string(), i);
        self.from_a.push(0.0);
        self.from_b.push(0.0);
        i
    }

    fn add_a(&mut self, doc_id: &str, value: f64) {
        let i = self.slot(doc_id);
        self.from_a[i] = value;
    }

    fn add_b(&mut self, doc_id: &str, value: f64) {
        let i = self.slot(doc_id);
        self.from_b[i] = value;
    }

    /// Combine contributions and order by fused score descending.
    ///
    /// The sort is stable, so equal scores stay in first-encounter order.
    fn rank<F>(self, combine: F, top_k: Option<usize>) -> Vec<(String, f64)>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut fused: Vec<(String, f64)> = self
            .order
            .into_iter()
            .zip(self.from_a.into_iter().zip(self.from_b))
            .map(|(doc, (a, b))| (doc, combine(a, b)))
            .collect();
        fused.sort_by(|x, y| y.1.total_cmp(&x.1));
        if let Some(k) = top_k {
            fused.truncate(k);
        }
        fused
    }
}

/// Union of both runs' topic ids, ascending
fn topic_union<'a>(run_a: &'a RankedResultSet, run_b: &'a RankedResultSet) -> BTreeSet<&'a str> {
    run_a.topic_ids().chain(run_b.topic_ids()).collect()
}

/// Shared driver: build per-topic candidates with `contribution`, then rank.
fn fuse_with<C, F>(
    run_a: &RankedResultSet,
    run_b: &RankedResultSet,
    tag: &str,
    top_k: Option<usize>,
    contribution: C,
    combine: F,
) -> RankedResultSet
where
    C: Fn(&[ResultEntry]) -> Vec<f64>,
    F: Fn(f64, f64) -> f64 + Copy,
{
    let mut fused = RankedResultSet::new(tag);

    for topic_id in topic_union(run_a, run_b) {
        let mut candidates = Candidates::default();
        let entries_a = run_a.topic(topic_id).unwrap_or(&[]);
        let entries_b = run_b.topic(topic_id).unwrap_or(&[]);

        for (entry, value) in entries_a.iter().zip(contribution(entries_a)) {
            candidates.add_a(&entry.doc_id, value);
        }
        for (entry, value) in entries_b.iter().zip(contribution(entries_b)) {
            candidates.add_b(&entry.doc_id, value);
        }

        let overlap = entries_a.len() + entries_b.len() - candidates.order.len();
        debug!(
            target: targets::FUSION,
            topic_id,
            from_a = entries_a.len(),
            from_b = entries_b.len(),
            overlap,
            "Fusing topic"
        );

        fused.insert_ordered(topic_id, candidates.rank(combine, top_k));
    }

    fused
}

// ============================================================================
// LinearFuser
// ============================================================================

/// Weighted linear fusion of normalized scores
///
/// For every document in either run:
///
/// ```text
/// fused = alpha * norm_a + (1 - alpha) * norm_b
/// ```
///
/// where `norm_x` is the per-topic min-max normalized score from run X, or 0
/// when run X did not retrieve the document. `alpha = 1.0` reproduces run A's
/// order; `alpha = 0.0` reproduces run B's.
#[derive(Debug, Clone)]
pub struct LinearFuser {
    alpha: f64,
    top_k: Option<usize>,
    tag: String,
}

impl LinearFuser {
    /// Create a linear fuser; `alpha` weights run A and must lie in `[0, 1]`
    pub fn new(alpha: f64) -> ClirResult<Self> {
        validate_alpha(alpha)?;
        Ok(LinearFuser {
            alpha,
            top_k: None,
            tag: DEFAULT_FUSED_TAG.to_string(),
        })
    }

    /// Builder: keep at most `top_k` documents per topic
    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder: set the output run tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Weight of run A
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Per-topic cutoff, if any
    pub fn top_k(&self) -> Option<usize> {
        self.top_k
    }
}

impl Fuser for LinearFuser {
    fn fuse(
        &self,
        run_a: &RankedResultSet,
        run_b: &RankedResultSet,
    ) -> ClirResult<RankedResultSet> {
        let alpha = self.alpha;
        let fused = fuse_with(
            run_a,
            run_b,
            &self.tag,
            self.top_k,
            normalize_topic,
            move |a, b| alpha * a + (1.0 - alpha) * b,
        );
        info!(
            target: targets::FUSION,
            fuser = self.name(),
            alpha,
            topics = fused.topic_count(),
            entries = fused.entry_count(),
            "Fused runs {} + {}",
            run_a.tag(),
            run_b.tag()
        );
        Ok(fused)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

// ============================================================================
// RrfFuser
// ============================================================================

/// Reciprocal Rank Fusion
///
/// Each run contributes `1 / (k_rrf + rank)` for every document it retrieved;
/// contributions are summed. Raw scores are ignored, so no normalization is
/// needed.
#[derive(Debug, Clone)]
pub struct RrfFuser {
    k_rrf: u32,
    top_k: Option<usize>,
    tag: String,
}

impl Default for RrfFuser {
    fn default() -> Self {
        RrfFuser {
            k_rrf: DEFAULT_RRF_K,
            top_k: None,
            tag: DEFAULT_FUSED_TAG.to_string(),
        }
    }
}

impl RrfFuser {
    /// Create with a custom smoothing constant
    pub fn new(k_rrf: u32) -> Self {
        RrfFuser {
            k_rrf,
            ..Self::default()
        }
    }

    /// Builder: keep at most `top_k` documents per topic
    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builder: set the output run tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Get the k_rrf parameter
    pub fn k_rrf(&self) -> u32 {
        self.k_rrf
    }
}

impl Fuser for RrfFuser {
    fn fuse(
        &self,
        run_a: &RankedResultSet,
        run_b: &RankedResultSet,
    ) -> ClirResult<RankedResultSet> {
        let k_rrf = f64::from(self.k_rrf);
        let reciprocal = move |entries: &[ResultEntry]| -> Vec<f64> {
            entries
                .iter()
                .map(|e| 1.0 / (k_rrf + f64::from(e.rank)))
                .collect()
        };
        let fused = fuse_with(run_a, run_b, &self.tag, self.top_k, reciprocal, |a, b| a + b);
        info!(
            target: targets::FUSION,
            fuser = self.name(),
            k_rrf = self.k_rrf,
            topics = fused.topic_count(),
            entries = fused.entry_count(),
            "Fused runs {} + {}",
            run_a.tag(),
            run_b.tag()
        );
        Ok(fused)
    }

    fn name(&self) -> &str {
        "rrf"
    }
}

// ============================================================================
// Convenience
// ============================================================================

/// Linear fusion with no cutoff and the default tag
pub fn fuse(
    run_a: &RankedResultSet,
    run_b: &RankedResultSet,
    alpha: f64,
) -> ClirResult<RankedResultSet> {
    LinearFuser::new(alpha)?.fuse(run_a, run_b)
}

/// Linear fusion keeping at most `top_k` documents per topic
pub fn fuse_top_k(
    run_a: &RankedResultSet,
    run_b: &RankedResultSet,
    alpha: f64,
    top_k: usize,
) -> ClirResult<RankedResultSet> {
    LinearFuser::new(alpha)?
        .with_top_k(Some(top_k))
        .fuse(run_a, run_b)
}

/// Build the fuser described by a `[fusion]` config section
pub fn fuser_from_config(section: &FusionSection) -> ClirResult<Box<dyn Fuser>> {
    let fuser: Box<dyn Fuser> = match section.method {
        FusionMethod::Linear => Box::new(
            LinearFuser::new(section.alpha)?
                .with_top_k(section.top_k())
                .with_tag(section.tag.clone()),
        ),
        FusionMethod::Rrf => {
            if section.rrf_k == 0 {
                return Err(ClirError::InvalidConfig(
                    "fusion.rrf_k must be at least 1".to_string(),
                ));
            }
            Box::new(
                RrfFuser::new(section.rrf_k)
                    .with_top_k(section.top_k())
                    .with_tag(section.tag.clone()),
            )
        }
    };
    Ok(fuser)
}

// ============================================================================
// Tests
// ============================================================================
