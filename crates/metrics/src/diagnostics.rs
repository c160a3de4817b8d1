//! Data alignment checks between runs, judgments and the collection
//!
//! None of these affect scores. They catch the usual experiment mistakes
//! before a report is trusted: topic ids that do not line up with the qrels,
//! and judged documents that never made it into the indexed collection.

use clir_core::logging::targets;
use clir_core::{RankedResultSet, RelevanceJudgments};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Number of example ids kept in mismatch samples
pub const SAMPLE_SIZE: usize = 5;

fn sample<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().take(SAMPLE_SIZE).map(str::to_string).collect()
}

/// Topic id agreement between a run and the qrels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicOverlap {
    /// Tag of the run checked
    pub run_tag: String,
    /// Topics with results in the run
    pub run_topics: usize,
    /// Topics with judgments
    pub judged_topics: usize,
    /// Topics in both
    pub shared: usize,
    /// Run topics without judgments
    pub run_only: usize,
    /// Judged topics the run has nothing for
    pub judged_only: usize,
    /// First few run-only ids, ascending
    pub run_only_sample: Vec<String>,
    /// First few judged-only ids, ascending
    pub judged_only_sample: Vec<String>,
}

impl TopicOverlap {
    /// True when both sides name exactly the same topics
    pub fn is_aligned(&self) -> bool {
        self.run_only == 0 && self.judged_only == 0
    }
}

/// Compare a run's topic ids to the judged topic ids
pub fn topic_overlap(run: &RankedResultSet, qrels: &RelevanceJudgments) -> TopicOverlap {
    let run_ids: BTreeSet<&str> = run.topic_ids().collect();
    let judged_ids: BTreeSet<&str> = qrels.topic_ids().collect();

    let run_only: Vec<&str> = run_ids.difference(&judged_ids).copied().collect();
    let judged_only: Vec<&str> = judged_ids.difference(&run_ids).copied().collect();

    let overlap = TopicOverlap {
        run_tag: run.tag().to_string(),
        run_topics: run_ids.len(),
        judged_topics: judged_ids.len(),
        shared: run_ids.intersection(&judged_ids).count(),
        run_only: run_only.len(),
        judged_only: judged_only.len(),
        run_only_sample: sample(run_only.iter().copied()),
        judged_only_sample: sample(judged_only.iter().copied()),
    };

    if overlap.shared == 0 {
        warn!(target: targets::EVAL, run = run.tag(), "Run shares no topics with qrels");
    } else {
        info!(
            target: targets::EVAL,
            run = run.tag(),
            shared = overlap.shared,
            run_only = overlap.run_only,
            judged_only = overlap.judged_only,
            "Topic overlap"
        );
    }
    overlap
}

/// Judged documents present in / missing from the collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgedCoverage {
    /// Distinct judged document ids
    pub judged_docs: usize,
    /// Distinct ids in the collection
    pub collection_docs: usize,
    /// Judged ids not in the collection
    pub missing: usize,
    /// First few missing ids, ascending
    pub missing_sample: Vec<String>,
}

impl JudgedCoverage {
    /// Fraction of judged documents present in the collection
    pub fn coverage(&self) -> f64 {
        if self.judged_docs == 0 {
            return 1.0;
        }
        (self.judged_docs - self.missing) as f64 / self.judged_docs as f64
    }
}

/// Check that every judged document exists in the collection id list.
///
/// Ids are compared after trimming whitespace.
pub fn judged_coverage<S: AsRef<str>>(
    qrels: &RelevanceJudgments,
    collection_ids: &[S],
) -> JudgedCoverage {
    let collection: BTreeSet<&str> = collection_ids.iter().map(|s| s.as_ref().trim()).collect();
    let judged = qrels.judged_doc_ids();
    let missing: Vec<&str> = judged
        .iter()
        .copied()
        .filter(|d| !collection.contains(d.trim()))
        .collect();

    if !missing.is_empty() {
        warn!(
            target: targets::EVAL,
            missing = missing.len(),
            judged = judged.len(),
            "Judged documents missing from collection"
        );
    }

    JudgedCoverage {
        judged_docs: judged.len(),
        collection_docs: collection.len(),
        missing: missing.len(),
        missing_sample: sample(missing.iter().copied()),
    }
}

/// Shape of a run: how many topics, how long the lists are
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Run tag
    pub tag: String,
    /// Topics with results
    pub topic_count: usize,
    /// Total entries
    pub entry_count: usize,
    /// Shortest topic list
    pub min_depth: usize,
    /// Longest topic list
    pub max_depth: usize,
}

/// Summarize a run's shape
pub fn run_summary(run: &RankedResultSet) -> RunSummary {
    let depths = || run.topics().map(|(_, entries)| entries.len());
    RunSummary {
        tag: run.tag().to_string(),
        topic_count: run.topic_count(),
        entry_count: run.entry_count(),
        min_depth: depths().min().unwrap_or(0),
        max_depth: depths().max().unwrap_or(0),
    }
}
