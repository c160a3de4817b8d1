//! Ranked result sets
//!
//! A [`RankedResultSet`] is one retrieval run: for each topic, an ordered list
//! of [`ResultEntry`] values. Topics are kept in a `BTreeMap` so iteration
//! (and therefore every file written from a set) is ordered by topic id.
//!
//! # Invariant
//!
//! Within a topic, ranks are `1..=N` with no gaps or repeats, and each
//! document appears at most once. Both insertion paths enforce this.
//! [`RankedResultSet::validate`] additionally checks that scores do not rise
//! with rank, which holds for `insert_scored` but not necessarily for rankings
//! taken verbatim from a run file.
//!
//! A topic that is absent means "nothing retrieved for that topic". Empty
//! rankings are never stored, so absence is the only way to say it.

use crate::error::{ClirError, ClirResult};
use crate::logging::targets;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Default tag for runs that do not name their producer
pub const DEFAULT_RUN_TAG: &str = "run";

// ============================================================================
// ResultEntry
// ============================================================================

/// One retrieved document within a topic's ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Document identifier, preserved byte-for-byte from the producer
    pub doc_id: String,
    /// 1-based position in the topic's ranking
    pub rank: u32,
    /// Producer score (higher = better)
    pub score: f64,
}

impl ResultEntry {
    /// Create a new entry
    pub fn new(doc_id: impl Into<String>, rank: u32, score: f64) -> Self {
        ResultEntry {
            doc_id: doc_id.into(),
            rank,
            score,
        }
    }
}

// ============================================================================
// RankedResultSet
// ============================================================================

/// Per-topic ranked document lists produced by one retrieval run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResultSet {
    tag: String,
    topics: BTreeMap<String, Vec<ResultEntry>>,
}

impl Default for RankedResultSet {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_TAG)
    }
}

impl RankedResultSet {
    /// Create an empty set labelled with a method tag
    pub fn new(tag: impl Into<String>) -> Self {
        RankedResultSet {
            tag: tag.into(),
            topics: BTreeMap::new(),
        }
    }

    /// Method tag written in the last column of run files
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Builder: replace the method tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Insert a topic from unordered `(doc_id, score)` pairs.
    ///
    /// Pairs are sorted by score descending. The sort is stable, so ties
    /// keep the order in which they were supplied. Repeated documents keep
    /// their first (best) position. Replaces any existing ranking for the topic.
    pub fn insert_scored(&mut self, topic_id: impl Into<String>, mut scored: Vec<(String, f64)>) {
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        self.insert_ordered(topic_id, scored);
    }

    /// Insert a topic from `(doc_id, score)` pairs already in rank order.
    ///
    /// Ranks are assigned `1..=N` from the supplied order. Repeated documents
    /// keep their first position. An empty list removes the topic.
    pub fn insert_ordered(&mut self, topic_id: impl Into<String>, ordered: Vec<(String, f64)>) {
        let topic_id = topic_id.into();
        let mut seen = HashSet::with_capacity(ordered.len());
        let mut entries = Vec::with_capacity(ordered.len());

        for (doc_id, score) in ordered {
            if !seen.insert(doc_id.clone()) {
                warn!(target: targets::RUN, topic_id = %topic_id, doc_id = %doc_id, "Dropping repeated document");
                continue;
            }
            let rank = (entries.len() + 1) as u32;
            entries.push(ResultEntry { doc_id, rank, score });
        }

        if entries.is_empty() {
            self.topics.remove(&topic_id);
        } else {
            self.topics.insert(topic_id, entries);
        }
    }

    /// Ranking for one topic, `None` when nothing was retrieved
    pub fn topic(&self, topic_id: &str) -> Option<&[ResultEntry]> {
        self.topics.get(topic_id).map(Vec::as_slice)
    }

    /// Whether the run retrieved anything for `topic_id`
    pub fn contains_topic(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// Topic ids in ascending order
    pub fn topic_ids(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// `(topic_id, ranking)` pairs in ascending topic order
    pub fn topics(&self) -> impl Iterator<Item = (&str, &[ResultEntry])> {
        self.topics
            .iter()
            .map(|(id, entries)| (id.as_str(), entries.as_slice()))
    }

    /// Document ids for a topic in rank order (empty when absent)
    pub fn doc_ids(&self, topic_id: &str) -> Vec<&str> {
        self.topic(topic_id)
            .map(|entries| entries.iter().map(|e| e.doc_id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of topics with at least one result
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total number of (topic, document) entries
    pub fn entry_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    /// True when no topic has results
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Keep only the first `top_k` entries of every topic
    pub fn truncate(&mut self, top_k: usize) {
        if top_k == 0 {
            self.topics.clear();
            return;
        }
        for entries in self.topics.values_mut() {
            entries.truncate(top_k);
        }
    }

    /// Check the rank invariant for every topic.
    ///
    /// Verifies ranks are `1..=N`, documents are unique, scores are finite
    /// and do not increase with rank.
    pub fn validate(&self) -> ClirResult<()> {
        for (topic_id, entries) in &self.topics {
            let invalid = |reason: String| ClirError::InvalidRanking {
                topic_id: topic_id.clone(),
                reason,
            };

            let mut seen = HashSet::with_capacity(entries.len());
            for (i, entry) in entries.iter().enumerate() {
                let expected = (i + 1) as u32;
                if entry.rank != expected {
                    return Err(invalid(format!(
                        "expected rank {} at position {}, found {}",
                        expected, i, entry.rank
                    )));
                }
                if !entry.score.is_finite() {
                    return Err(invalid(format!("non-finite score at rank {}", entry.rank)));
                }
                if !seen.insert(entry.doc_id.as_str()) {
                    return Err(invalid(format!("document {} appears twice", entry.doc_id)));
                }
            }

            if let Some(pair) = entries.windows(2).find(|w| w[1].score > w[0].score) {
                return Err(invalid(format!(
                    "score increases from rank {} to rank {}",
                    pair[0].rank, pair[1].rank
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
