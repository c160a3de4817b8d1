//! Test utilities for CLIR comprehensive tests

#![allow(dead_code)]

use clir::{Judgment, RankedResultSet, RelevanceJudgments};
use std::path::{Path, PathBuf};

/// Build a run from `(topic, [(doc, score)])`, ordered by score
pub fn make_run(tag: &str, topics: &[(&str, &[(&str, f64)])]) -> RankedResultSet {
    let mut run = RankedResultSet::new(tag);
    for (topic, docs) in topics {
        run.insert_scored(
            *topic,
            docs.iter().map(|(d, s)| (d.to_string(), *s)).collect(),
        );
    }
    run
}

/// Build a run from `(topic, [doc])` in the given order, with descending scores
pub fn make_ranked(tag: &str, topics: &[(&str, &[&str])]) -> RankedResultSet {
    let mut run = RankedResultSet::new(tag);
    for (topic, docs) in topics {
        let n = docs.len() as f64;
        run.insert_ordered(
            *topic,
            docs.iter()
                .enumerate()
                .map(|(i, d)| (d.to_string(), n - i as f64))
                .collect(),
        );
    }
    run
}

/// Build a judgment store from `(topic, doc, grade)`
pub fn make_qrels(items: &[(&str, &str, u32)]) -> RelevanceJudgments {
    items
        .iter()
        .map(|(t, d, g)| Judgment::new(*t, *d, *g))
        .collect()
}

/// Ranks of one topic
pub fn ranks(run: &RankedResultSet, topic: &str) -> Vec<u32> {
    run.topic(topic)
        .map(|entries| entries.iter().map(|e| e.rank).collect())
        .unwrap_or_default()
}

/// Scores of one topic
pub fn scores(run: &RankedResultSet, topic: &str) -> Vec<f64> {
    run.topic(topic)
        .map(|entries| entries.iter().map(|e| e.score).collect())
        .unwrap_or_default()
}

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Approximate float equality
pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Lexical run in the shape the BM25 baseline writes
pub const BM25_RUN: &str = "\
101 Q0 d1 1 14.250000 BM25_Elastic
101 Q0 d2 2 11.000000 BM25_Elastic
101 Q0 d3 3 7.500000 BM25_Elastic
102 Q0 d4 1 9.000000 BM25_Elastic
102 Q0 d5 2 3.000000 BM25_Elastic
";

/// Dense run in the shape the vector retrieval writes
pub const DENSE_RUN: &str = "\
101 Q0 d2 1 0.910000 CLIR_Project
101 Q0 d6 2 0.850000 CLIR_Project
101 Q0 d1 3 0.700000 CLIR_Project
103 Q0 d7 1 0.600000 CLIR_Project
";

/// 4-column graded judgments
pub const QRELS: &str = "\
101 0 d1 3
101 0 d2 1
101 0 d6 2
101 0 d9 0
102 0 d5 1
103 0 d8 1
";
