//! Tier 2: File Formats
//!
//! Run files are 6 columns, qrel files 3 or 4. Bad lines are logged and
//! skipped unless strict parsing is requested.

use crate::test_utils::*;
use clir::{
    load_id_list, load_qrels, load_run, read_qrels, read_run, save_run, ClirError, ParseMode,
};
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_tier2_run_file_fields() {
    let (run, report) = read_run(Cursor::new(BM25_RUN), ParseMode::Strict).unwrap();
    assert_eq!(run.tag(), "BM25_Elastic");
    assert_eq!(run.topic_count(), 2);
    assert_eq!(report.lines_read, 5);
    assert_eq!(report.skipped, 0);

    let first = &run.topic("101").unwrap()[0];
    assert_eq!(first.doc_id, "d1");
    assert_eq!(first.rank, 1);
    assert!(approx(first.score, 14.25));
}

#[test]
fn test_tier2_bad_run_lines_skipped() {
    let input = "\
1 Q0 a 1 2.0 t
1 Q0 b 2 t
1 X0 c 3 1.0 t
1 Q0 d three 1.0 t
1 Q0 e 4 NaN t
1 Q0 f 5 0.5 t
";
    let (run, report) = read_run(Cursor::new(input), ParseMode::Lenient).unwrap();
    assert_eq!(run.doc_ids("1"), vec!["a", "f"]);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.skipped, 4);
    assert_eq!(report.skipped_lines, vec![2, 3, 4, 5]);
}

#[test]
fn test_tier2_strict_run_parsing_fails() {
    let input = "1 Q0 a 1 2.0 t\n1 Q0 b\n";
    let err = read_run(Cursor::new(input), ParseMode::Strict).unwrap_err();
    assert!(matches!(err, ClirError::MalformedResultLine { line_no: 2, .. }));
}

#[test]
fn test_tier2_qrels_three_and_four_columns() {
    let input = "101 d1 2\n101 0 d2 1\n102 Q0 d3 0\n";
    let (qrels, report) = read_qrels(Cursor::new(input), ParseMode::Strict).unwrap();
    assert_eq!(report.accepted, 3);
    assert_eq!(qrels.grade("101", "d1"), 2);
    assert_eq!(qrels.grade("101", "d2"), 1);
    assert_eq!(qrels.grade("102", "d3"), 0);
    assert_eq!(qrels.grade("102", "unjudged"), 0);
}

#[test]
fn test_tier2_bad_qrel_lines_skipped() {
    let input = "101 d1 2\n101 d2\n101 0 d3 -1\n101 0 d4 high\n101 d5 1\n";
    let (qrels, report) = read_qrels(Cursor::new(input), ParseMode::Lenient).unwrap();
    assert_eq!(qrels.judgment_count(), 2);
    assert_eq!(report.skipped, 3);
}

#[test]
fn test_tier2_strict_qrel_parsing_fails() {
    let err = read_qrels(Cursor::new("101 d1 x\n"), ParseMode::Strict).unwrap_err();
    assert!(matches!(err, ClirError::MalformedJudgmentLine { line_no: 1, .. }));
}

#[test]
fn test_tier2_save_and_reload_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("hybrid.trec");
    let run = make_run(
        "Hybrid",
        &[("101", &[("d1", 0.75), ("d2", 0.5)]), ("102", &[("d4", 1.0)])],
    );

    save_run(&run, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("101 Q0 d1 1 0.750000 Hybrid\n"));

    let (reloaded, _) = load_run(&path, ParseMode::Strict).unwrap();
    assert_eq!(reloaded, run);
}

#[test]
fn test_tier2_load_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let qrels_path = write_file(dir.path(), "qrels.txt", QRELS);
    let ids_path = write_file(dir.path(), "doc_ids.txt", "d1\n\n  d2  \nd3\n");

    let (qrels, _) = load_qrels(&qrels_path, ParseMode::Strict).unwrap();
    assert_eq!(qrels.topic_count(), 3);
    assert_eq!(load_id_list(&ids_path).unwrap(), vec!["d1", "d2", "d3"]);
}

#[test]
fn test_tier2_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_run(&dir.path().join("nope.trec"), ParseMode::Lenient).unwrap_err();
    assert!(matches!(err, ClirError::Io(_)));
}
