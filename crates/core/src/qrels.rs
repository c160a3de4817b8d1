//! Relevance judgment store
//!
//! Maps topic id -> document id -> graded relevance. Grades are non-negative
//! with no fixed upper bound; 0 means judged not relevant. The store is
//! assembled once (from a file or an iterator of judgments) and exposes no
//! mutation afterwards.

use crate::logging::targets;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::warn;

/// One parsed relevance judgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    /// Topic identifier
    pub topic_id: String,
    /// Document identifier
    pub doc_id: String,
    /// Graded relevance (0 = not relevant)
    pub grade: u32,
}

impl Judgment {
    /// Create a new judgment
    pub fn new(topic_id: impl Into<String>, doc_id: impl Into<String>, grade: u32) -> Self {
        Judgment {
            topic_id: topic_id.into(),
            doc_id: doc_id.into(),
            grade,
        }
    }
}

/// Ground-truth relevance judgments for a topic set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceJudgments {
    topics: BTreeMap<String, HashMap<String, u32>>,
}

impl RelevanceJudgments {
    /// Build a store from judgments.
    ///
    /// A repeated (topic, document) pair keeps the last grade seen.
    pub fn from_judgments<I>(judgments: I) -> Self
    where
        I: IntoIterator<Item = Judgment>,
    {
        let mut topics: BTreeMap<String, HashMap<String, u32>> = BTreeMap::new();
        for j in judgments {
            let grades = topics.entry(j.topic_id.clone()).or_default();
            if let Some(previous) = grades.insert(j.doc_id.clone(), j.grade) {
                if previous != j.grade {
                    warn!(
                        target: targets::QRELS,
                        topic_id = %j.topic_id,
                        doc_id = %j.doc_id,
                        previous,
                        grade = j.grade,
                        "Repeated judgment, keeping last grade"
                    );
                }
            }
        }
        RelevanceJudgments { topics }
    }

    /// Grades for one topic, `None` if the topic was never judged
    pub fn topic(&self, topic_id: &str) -> Option<&HashMap<String, u32>> {
        self.topics.get(topic_id)
    }

    /// Whether `topic_id` has any judgments
    pub fn contains_topic(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// Grade of a document, 0 when unjudged
    pub fn grade(&self, topic_id: &str, doc_id: &str) -> u32 {
        self.topics
            .get(topic_id)
            .and_then(|grades| grades.get(doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Documents with grade > 0 for a topic (empty when the topic is unknown)
    pub fn relevant_docs(&self, topic_id: &str) -> HashSet<&str> {
        self.topics
            .get(topic_id)
            .map(|grades| {
                grades
                    .iter()
                    .filter(|(_, g)| **g > 0)
                    .map(|(d, _)| d.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Judged topic ids in ascending order
    pub fn topic_ids(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Number of judged topics
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total number of (topic, document) judgments
    pub fn judgment_count(&self) -> usize {
        self.topics.values().map(HashMap::len).sum()
    }

    /// True when no topic is judged
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Every judged document id across all topics
    pub fn judged_doc_ids(&self) -> BTreeSet<&str> {
        self.topics
            .values()
            .flat_map(|grades| grades.keys().map(String::as_str))
            .collect()
    }

    /// Summary counts per topic
    pub fn summary(&self) -> QrelSummary {
        let relevant_counts: Vec<usize> = self
            .topics
            .values()
            .map(|grades| grades.values().filter(|&&g| g > 0).count())
            .collect();

        let topic_count = relevant_counts.len();
        let mean_relevant = if topic_count == 0 {
            0.0
        } else {
            relevant_counts.iter().sum::<usize>() as f64 / topic_count as f64
        };

        QrelSummary {
            topic_count,
            judgment_count: self.judgment_count(),
            min_relevant: relevant_counts.iter().copied().min().unwrap_or(0),
            max_relevant: relevant_counts.iter().copied().max().unwrap_or(0),
            mean_relevant,
            topics_without_relevant: relevant_counts.iter().filter(|&&c| c == 0).count(),
        }
    }
}

impl FromIterator<Judgment> for RelevanceJudgments {
    fn from_iter<T: IntoIterator<Item = Judgment>>(iter: T) -> Self {
        Self::from_judgments(iter)
    }
}

/// Relevant-document statistics over a judgment store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrelSummary {
    /// Judged topics
    pub topic_count: usize,
    /// Total judgments
    pub judgment_count: usize,
    /// Fewest relevant documents in any topic
    pub min_relevant: usize,
    /// Most relevant documents in any topic
    pub max_relevant: usize,
    /// Mean relevant documents per topic
    pub mean_relevant: f64,
    /// Topics whose judgments are all grade 0
    pub topics_without_relevant: usize,
}
