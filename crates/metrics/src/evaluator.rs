//! Run evaluation against relevance judgments
//!
//! [`Evaluator::evaluate`] scores every judged topic of a run with the
//! configured metrics and averages them into an aggregate report.
//!
//! # Topics in only one input
//!
//! - Judged but not retrieved: handled by [`MissingTopicPolicy`]. `Skip`
//!   leaves the topic out of the mean; `Zero` scores it 0.0 on every metric
//!   and includes it in the denominator.
//! - Retrieved but not judged: ignored and counted as `topics_unjudged`.

use crate::metrics::{average_precision, ndcg_at_k, precision_at_k, recall_at_k, reciprocal_rank};
use clir_core::logging::targets;
use clir_core::{
    ClirError, ClirResult, EvaluationSection, MissingTopicPolicy, RankedResultSet,
    RelevanceJudgments,
};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

// ============================================================================
// Metric
// ============================================================================

/// A per-topic metric with its cutoff, if it has one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Precision@k
    Precision(usize),
    /// Recall@k
    Recall(usize),
    /// Average precision (MAP when averaged)
    AveragePrecision,
    /// NDCG@k with exponential gain
    Ndcg(usize),
    /// Reciprocal rank (MRR when averaged)
    ReciprocalRank,
}

impl Metric {
    /// Score one topic
    pub fn compute(
        &self,
        retrieved: &[&str],
        judgments: &HashMap<String, u32>,
        relevant: &HashSet<&str>,
    ) -> f64 {
        match *self {
            Metric::Precision(k) => precision_at_k(retrieved, relevant, k),
            Metric::Recall(k) => recall_at_k(retrieved, relevant, k),
            Metric::AveragePrecision => average_precision(retrieved, relevant),
            Metric::Ndcg(k) => ndcg_at_k(retrieved, judgments, k),
            Metric::ReciprocalRank => reciprocal_rank(retrieved, relevant),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Precision(k) => write!(f, "P@{}", k),
            Metric::Recall(k) => write!(f, "Recall@{}", k),
            Metric::AveragePrecision => write!(f, "MAP"),
            Metric::Ndcg(k) => write!(f, "NDCG@{}", k),
            Metric::ReciprocalRank => write!(f, "MRR"),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// EvalConfig
// ============================================================================

/// Which metrics to compute and how to treat unretrieved topics
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Metrics in report order
    pub metrics: Vec<Metric>,
    /// Treatment of judged topics absent from the run
    pub missing_topics: MissingTopicPolicy,
}

impl EvalConfig {
    /// Build from the `[evaluation]` config section.
    ///
    /// Report order: precision, recall, MAP, each NDCG cutoff, MRR.
    pub fn from_section(section: &EvaluationSection) -> Self {
        let mut metrics = vec![
            Metric::Precision(section.precision_k),
            Metric::Recall(section.recall_k),
            Metric::AveragePrecision,
        ];
        metrics.extend(section.ndcg_k.iter().map(|&k| Metric::Ndcg(k)));
        metrics.push(Metric::ReciprocalRank);
        EvalConfig {
            metrics,
            missing_topics: section.missing_topics,
        }
    }

    /// Builder: replace the missing-topic policy
    pub fn with_missing_topics(mut self, policy: MissingTopicPolicy) -> Self {
        self.missing_topics = policy;
        self
    }
}

impl Default for EvalConfig {
    /// P@5, Recall@1000, MAP, NDCG@5, NDCG@100, MRR; missing topics skipped
    fn default() -> Self {
        Self::from_section(&EvaluationSection::default())
    }
}

// ============================================================================
// Results
// ============================================================================

/// One metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricScore {
    /// Which metric
    pub metric: Metric,
    /// Its value
    pub value: f64,
}

/// Scores for one topic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMetrics {
    /// Topic identifier
    pub topic_id: String,
    /// Documents retrieved for the topic
    pub retrieved: usize,
    /// Documents judged for the topic
    pub judged: usize,
    /// Documents judged relevant (grade > 0)
    pub relevant: usize,
    /// True when the run retrieved nothing and the topic was zero-scored
    pub missing: bool,
    /// Values in report order
    pub scores: Vec<MetricScore>,
}

impl TopicMetrics {
    /// Value of one metric
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.value)
    }
}

/// Per-topic and aggregate scores for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Tag of the evaluated run
    pub run_tag: String,
    /// Policy applied to judged topics with no results
    pub missing_topics: MissingTopicPolicy,
    /// Topics contributing to the means
    pub topics_scored: usize,
    /// Judged topics the run retrieved nothing for
    pub topics_missing: usize,
    /// Run topics with no judgments
    pub topics_unjudged: usize,
    /// Means over scored topics; empty when no topic was scored
    pub aggregate: Vec<MetricScore>,
    /// Per-topic scores in topic order
    pub per_topic: Vec<TopicMetrics>,
}

impl Evaluation {
    /// Mean of one metric, `None` if not computed or nothing was scored
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.aggregate
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.value)
    }

    /// Scores for one topic
    pub fn topic(&self, topic_id: &str) -> Option<&TopicMetrics> {
        self.per_topic.iter().find(|t| t.topic_id == topic_id)
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Scores runs against a fixed metric configuration
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create with a metric configuration
    pub fn new(config: EvalConfig) -> Self {
        Evaluator { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate a run.
    ///
    /// # Errors
    ///
    /// `EmptyQrels` when the judgment store has no topics.
    pub fn evaluate(
        &self,
        run: &RankedResultSet,
        qrels: &RelevanceJudgments,
    ) -> ClirResult<Evaluation> {
        if qrels.is_empty() {
            return Err(ClirError::EmptyQrels);
        }

        let policy = self.config.missing_topics;
        let mut per_topic = Vec::new();
        let mut topics_missing = 0;

        for topic_id in qrels.topic_ids() {
            let judgments = match qrels.topic(topic_id) {
                Some(j) => j,
                None => continue,
            };
            let retrieved = run.doc_ids(topic_id);

            let missing = retrieved.is_empty();
            if missing {
                topics_missing += 1;
                if policy == MissingTopicPolicy::Skip {
                    debug!(target: targets::EVAL, topic_id, "Judged topic not in run, skipping");
                    continue;
                }
            }

            let relevant = qrels.relevant_docs(topic_id);
            let scores = self
                .config
                .metrics
                .iter()
                .map(|&metric| MetricScore {
                    metric,
                    value: metric.compute(&retrieved, judgments, &relevant),
                })
                .collect();

            per_topic.push(TopicMetrics {
                topic_id: topic_id.to_string(),
                retrieved: retrieved.len(),
                judged: judgments.len(),
                relevant: relevant.len(),
                missing,
                scores,
            });
        }

        let topics_unjudged = run
            .topic_ids()
            .filter(|t| !qrels.contains_topic(t))
            .count();

        let aggregate = mean_scores(&self.config.metrics, &per_topic);
        if aggregate.is_empty() {
            warn!(
                target: targets::EVAL,
                run = run.tag(),
                "No topic overlap between run and qrels"
            );
        }

        info!(
            target: targets::EVAL,
            run = run.tag(),
            topics_scored = per_topic.len(),
            topics_missing,
            topics_unjudged,
            policy = %policy,
            "Evaluated run"
        );

        Ok(Evaluation {
            run_tag: run.tag().to_string(),
            missing_topics: policy,
            topics_scored: per_topic.len(),
            topics_missing,
            topics_unjudged,
            aggregate,
            per_topic,
        })
    }
}

/// Arithmetic mean per metric across topics
fn mean_scores(metrics: &[Metric], per_topic: &[TopicMetrics]) -> Vec<MetricScore> {
    if per_topic.is_empty() {
        return Vec::new();
    }
    let n = per_topic.len() as f64;
    metrics
        .iter()
        .enumerate()
        .map(|(i, &metric)| {
            let sum: f64 = per_topic.iter().map(|t| t.scores[i].value).sum();
            MetricScore {
                metric,
                value: sum / n,
            }
        })
        .collect()
}

/// Evaluate with the default metric set and skip policy
pub fn evaluate(run: &RankedResultSet, qrels: &RelevanceJudgments) -> ClirResult<Evaluation> {
    Evaluator::default().evaluate(run, qrels)
}

// ============================================================================
// Tests
// ============================================================================
