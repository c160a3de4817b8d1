//! Retrieval evaluation for the CLIR harness
//!
//! - metrics: single-topic metric functions (precision, recall, AP, NDCG, RR)
//! - evaluator: per-topic and aggregate scoring of a run against qrels
//! - diagnostics: topic overlap, judged-document coverage, run shape

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod evaluator;
pub mod metrics;

pub use diagnostics::{
    judged_coverage, run_summary, topic_overlap, JudgedCoverage, RunSummary, TopicOverlap,
};
pub use evaluator::{
    evaluate, EvalConfig, Evaluation, Evaluator, Metric, MetricScore, TopicMetrics,
};
pub use metrics::{
    average_precision, dcg, gain, ndcg_at_k, precision_at_k, recall_at_k, reciprocal_rank,
};
