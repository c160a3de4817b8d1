//! Tier 1: Ranking Invariants
//!
//! Every ranked result set, however it was produced, has ranks 1..N per
//! topic with no gaps, no repeats and no repeated documents.

use crate::test_utils::*;
use clir::{fuse, normalize_run, read_run, write_run, ParseMode, RankedResultSet, RrfFuser, Fuser};
use std::io::Cursor;

fn assert_contiguous(run: &RankedResultSet) {
    for (topic, entries) in run.topics() {
        let expected: Vec<u32> = (1..=entries.len() as u32).collect();
        let actual: Vec<u32> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(actual, expected, "topic {topic}");
    }
    run.validate().unwrap();
}

#[test]
fn test_tier1_scored_insert_is_contiguous() {
    let run = make_run(
        "t",
        &[("1", &[("a", 0.1), ("b", 0.9), ("c", 0.5), ("a", 0.2)])],
    );
    assert_contiguous(&run);
    assert_eq!(run.doc_ids("1"), vec!["b", "c", "a"]);
}

#[test]
fn test_tier1_loaded_run_is_renumbered() {
    // Ranks in the file have a gap, a repeat and are out of order.
    let input = "\
1 Q0 c 7 1.0 x
1 Q0 a 2 3.0 x
1 Q0 b 5 2.0 x
1 Q0 a 9 0.5 x
";
    let (run, report) = read_run(Cursor::new(input), ParseMode::Lenient).unwrap();
    assert_eq!(report.accepted, 4);
    assert_eq!(run.doc_ids("1"), vec!["a", "b", "c"]);
    assert_contiguous(&run);
}

#[test]
fn test_tier1_fused_run_is_contiguous() {
    let a = make_run("A", &[("1", &[("a", 3.0), ("b", 2.0)]), ("2", &[("x", 1.0)])]);
    let b = make_run("B", &[("1", &[("c", 9.0), ("a", 1.0)]), ("3", &[("y", 0.3)])]);

    assert_contiguous(&fuse(&a, &b, 0.7).unwrap());
    assert_contiguous(&RrfFuser::default().fuse(&a, &b).unwrap());
}

#[test]
fn test_tier1_normalized_run_keeps_order() {
    let run = make_run("A", &[("1", &[("a", 30.0), ("b", 20.0), ("c", 20.0)])]);
    let norm = normalize_run(&run);
    assert_eq!(norm.doc_ids("1"), run.doc_ids("1"));
    assert_contiguous(&norm);
}

#[test]
fn test_tier1_fusion_is_deterministic() {
    let a = make_run(
        "A",
        &[("1", &[("a", 1.0), ("b", 1.0), ("c", 0.5), ("d", 0.5)])],
    );
    let b = make_run("B", &[("1", &[("e", 2.0), ("d", 2.0), ("f", 1.0)])]);

    let render = |run: &RankedResultSet| {
        let mut buf = Vec::new();
        write_run(run, &mut buf).unwrap();
        buf
    };

    let first = render(&fuse(&a, &b, 0.5).unwrap());
    for _ in 0..10 {
        assert_eq!(render(&fuse(&a, &b, 0.5).unwrap()), first);
    }
}

#[test]
fn test_tier1_absent_topic_is_not_empty_topic() {
    let run = make_ranked("t", &[("1", &["a"])]);
    assert!(run.topic("2").is_none());
    assert!(!run.contains_topic("2"));
    assert_eq!(run.topic_count(), 1);
}
