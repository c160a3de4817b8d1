//! Tier 4: Evaluation
//!
//! Metric values on the fixture run, missing-topic policies, runs with no
//! judged topics and the overlap diagnostics.

use crate::test_utils::*;
use clir::{
    evaluate, read_qrels, read_run, topic_overlap, ClirError, EvalConfig, Evaluator, Metric,
    MissingTopicPolicy, ParseMode, RelevanceJudgments,
};
use std::io::Cursor;

fn fixtures() -> (clir::RankedResultSet, clir::RankedResultSet, RelevanceJudgments) {
    let (bm25, _) = read_run(Cursor::new(BM25_RUN), ParseMode::Strict).unwrap();
    let (dense, _) = read_run(Cursor::new(DENSE_RUN), ParseMode::Strict).unwrap();
    let (qrels, _) = read_qrels(Cursor::new(QRELS), ParseMode::Strict).unwrap();
    (bm25, dense, qrels)
}

#[test]
fn test_tier4_bm25_per_topic_values() {
    let (bm25, _, qrels) = fixtures();
    let eval = evaluate(&bm25, &qrels).unwrap();

    let t101 = eval.topic("101").unwrap();
    assert_eq!(t101.relevant, 3);
    assert_eq!(t101.judged, 4);
    assert!(approx(t101.get(Metric::Precision(5)).unwrap(), 0.4));
    assert!(approx(t101.get(Metric::Recall(1000)).unwrap(), 2.0 / 3.0));
    assert!(approx(t101.get(Metric::AveragePrecision).unwrap(), 2.0 / 3.0));
    assert!(approx(t101.get(Metric::ReciprocalRank).unwrap(), 1.0));

    let log3 = 3f64.log2();
    let dcg = 7.0 + 1.0 / log3;
    let idcg = 7.0 + 3.0 / log3 + 1.0 / 2.0;
    assert!(approx(t101.get(Metric::Ndcg(5)).unwrap(), dcg / idcg));

    let t102 = eval.topic("102").unwrap();
    assert!(approx(t102.get(Metric::AveragePrecision).unwrap(), 0.5));
    assert!(approx(t102.get(Metric::Ndcg(5)).unwrap(), 1.0 / log3));
}

#[test]
fn test_tier4_skip_policy_aggregate() {
    let (bm25, _, qrels) = fixtures();
    let eval = evaluate(&bm25, &qrels).unwrap();

    assert_eq!(eval.missing_topics, MissingTopicPolicy::Skip);
    assert_eq!(eval.topics_scored, 2);
    assert_eq!(eval.topics_missing, 1);
    assert_eq!(eval.topics_unjudged, 0);
    assert!(eval.topic("103").is_none());

    assert!(approx(eval.mean(Metric::Precision(5)).unwrap(), 0.3));
    assert!(approx(eval.mean(Metric::AveragePrecision).unwrap(), 7.0 / 12.0));
    assert!(approx(eval.mean(Metric::ReciprocalRank).unwrap(), 0.75));
}

#[test]
fn test_tier4_zero_policy_aggregate() {
    let (bm25, _, qrels) = fixtures();
    let config = EvalConfig::default().with_missing_topics(MissingTopicPolicy::Zero);
    let eval = Evaluator::new(config).evaluate(&bm25, &qrels).unwrap();

    assert_eq!(eval.topics_scored, 3);
    assert_eq!(eval.topics_missing, 1);
    let t103 = eval.topic("103").unwrap();
    assert!(t103.missing);
    assert!(t103.scores.iter().all(|s| s.value == 0.0));

    assert!(approx(eval.mean(Metric::Precision(5)).unwrap(), 0.2));
    assert!(approx(eval.mean(Metric::ReciprocalRank).unwrap(), 0.5));
}

#[test]
fn test_tier4_dense_run_unjudged_documents() {
    let (_, dense, qrels) = fixtures();
    let eval = evaluate(&dense, &qrels).unwrap();

    // Topic 101 retrieves all three relevant documents.
    let t101 = eval.topic("101").unwrap();
    assert!(approx(t101.get(Metric::AveragePrecision).unwrap(), 1.0));
    assert!(approx(t101.get(Metric::Precision(5)).unwrap(), 0.6));

    // Topic 103 retrieves only an unjudged document.
    let t103 = eval.topic("103").unwrap();
    assert_eq!(t103.get(Metric::ReciprocalRank), Some(0.0));
    assert_eq!(t103.get(Metric::Ndcg(5)), Some(0.0));
}

#[test]
fn test_tier4_no_shared_topics() {
    let (_, _, qrels) = fixtures();
    let run = make_ranked("x", &[("999", &["d1", "d2"])]);

    let eval = evaluate(&run, &qrels).unwrap();
    assert_eq!(eval.topics_scored, 0);
    assert_eq!(eval.topics_unjudged, 1);
    assert_eq!(eval.topics_missing, 3);
    assert!(eval.aggregate.is_empty());
    assert_eq!(eval.mean(Metric::AveragePrecision), None);
}

#[test]
fn test_tier4_empty_qrels_is_error() {
    let (bm25, _, _) = fixtures();
    let err = evaluate(&bm25, &RelevanceJudgments::default()).unwrap_err();
    assert!(matches!(err, ClirError::EmptyQrels));
}

#[test]
fn test_tier4_topic_overlap_diagnostics() {
    let (bm25, dense, qrels) = fixtures();

    let overlap = topic_overlap(&bm25, &qrels);
    assert_eq!(overlap.shared, 2);
    assert_eq!(overlap.judged_only_sample, vec!["103"]);
    assert!(!overlap.is_aligned());

    let none = topic_overlap(&make_ranked("x", &[("7", &["a"])]), &qrels);
    assert_eq!(none.shared, 0);
    assert_eq!(none.run_only_sample, vec!["7"]);

    let dense_overlap = topic_overlap(&dense, &qrels);
    assert_eq!(dense_overlap.judged_only_sample, vec!["102"]);
}

#[test]
fn test_tier4_qrel_grades_matter_only_for_ndcg() {
    let run = make_ranked("x", &[("1", &["a", "b"])]);
    let high = make_qrels(&[("1", "a", 3), ("1", "b", 1)]);
    let flat = make_qrels(&[("1", "a", 1), ("1", "b", 1)]);

    let e_high = evaluate(&run, &high).unwrap();
    let e_flat = evaluate(&run, &flat).unwrap();
    assert_eq!(
        e_high.mean(Metric::AveragePrecision),
        e_flat.mean(Metric::AveragePrecision)
    );
    assert!(approx(e_high.mean(Metric::Ndcg(5)).unwrap(), 1.0));
    assert!(approx(e_flat.mean(Metric::Ndcg(5)).unwrap(), 1.0));

    let swapped = make_ranked("x", &[("1", &["b", "a"])]);
    assert!(evaluate(&swapped, &high).unwrap().mean(Metric::Ndcg(5)).unwrap() < 1.0);
}

#[test]
fn test_tier4_report_serializes_metric_labels() {
    let (bm25, _, qrels) = fixtures();
    let eval = evaluate(&bm25, &qrels).unwrap();

    let json = serde_json::to_value(&eval).unwrap();
    assert_eq!(json["run_tag"], "BM25_Elastic");
    assert_eq!(json["missing_topics"], "skip");
    assert_eq!(json["aggregate"][2]["metric"], "MAP");
    assert_eq!(json["per_topic"].as_array().unwrap().len(), 2);
}
