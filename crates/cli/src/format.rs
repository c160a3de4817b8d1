//! Report → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): aligned text tables
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use std::fmt::Write as _;
use std::path::PathBuf;

use clir_core::{ClirError, LoadReport, QrelSummary};
use clir_metrics::{Evaluation, JudgedCoverage, RunSummary, TopicOverlap};
use serde::Serialize;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Width of the metric label column
const LABEL_WIDTH: usize = 14;

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Format an error.
pub fn format_error(err: &ClirError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&serde_json::json!({ "error": err.to_string() })),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn skipped_note(report: &LoadReport) -> String {
    if report.skipped == 0 {
        String::new()
    } else {
        format!(
            " ({} malformed line(s) skipped, first at {:?})",
            report.skipped, report.skipped_lines
        )
    }
}

// =========================================================================
// evaluate
// =========================================================================

/// Format evaluation results for one or more runs.
pub fn format_evaluations(evals: &[Evaluation], per_topic: bool, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            if per_topic {
                to_json(evals)
            } else {
                let trimmed: Vec<serde_json::Value> = evals
                    .iter()
                    .map(|e| {
                        let mut v = serde_json::to_value(e).unwrap_or_default();
                        if let Some(obj) = v.as_object_mut() {
                            obj.remove("per_topic");
                        }
                        v
                    })
                    .collect();
                to_json(&trimmed)
            }
        }
        OutputMode::Human => evals
            .iter()
            .map(|e| format_evaluation_human(e, per_topic))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_evaluation_human(eval: &Evaluation, per_topic: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Evaluation for {} (scored: {}, missing: {} [{}], unjudged: {})",
        eval.run_tag, eval.topics_scored, eval.topics_missing, eval.missing_topics,
        eval.topics_unjudged
    );

    if eval.aggregate.is_empty() {
        let _ = writeln!(out, "  No topic overlap with qrels");
        return out;
    }
    for score in &eval.aggregate {
        let _ = writeln!(
            out,
            "  {:<width$}{:.4}",
            format!("{}:", score.metric),
            score.value,
            width = LABEL_WIDTH
        );
    }

    if per_topic && !eval.per_topic.is_empty() {
        let _ = write!(out, "\n  {:<12}", "topic");
        for score in &eval.aggregate {
            let _ = write!(out, "{:>12}", score.metric.to_string());
        }
        out.push('\n');
        for topic in &eval.per_topic {
            let _ = write!(out, "  {:<12}", topic.topic_id);
            for score in &topic.scores {
                let _ = write!(out, "{:>12.4}", score.value);
            }
            out.push('\n');
        }
    }
    out
}

// =========================================================================
// fuse / normalize
// =========================================================================

/// Summary printed after writing a run to a file
#[derive(Debug, Serialize)]
pub struct WriteSummary {
    /// What produced the run (`linear`, `rrf`, `normalize`)
    pub operation: String,
    /// Tag written to the run
    pub tag: String,
    /// Destination
    pub path: PathBuf,
    /// Topics written
    pub topic_count: usize,
    /// Lines written
    pub entry_count: usize,
}

/// Format a write summary.
pub fn format_write_summary(summary: &WriteSummary, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(summary),
        OutputMode::Human => format!(
            "Wrote {} run '{}' to {} ({} topics, {} entries)",
            summary.operation,
            summary.tag,
            summary.path.display(),
            summary.topic_count,
            summary.entry_count
        ),
    }
}

// =========================================================================
// check
// =========================================================================

/// Diagnostics for one run file
#[derive(Debug, Serialize)]
pub struct RunCheck {
    /// Source file
    pub path: PathBuf,
    /// Parse outcome
    pub load: LoadReport,
    /// Shape of the run
    pub summary: RunSummary,
    /// Topic agreement with the qrels
    pub overlap: TopicOverlap,
}

/// Everything `clir check` reports
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Qrel parse outcome
    pub qrels_load: LoadReport,
    /// Qrel statistics
    pub qrels: QrelSummary,
    /// Judged documents vs collection, when a collection list was given
    pub coverage: Option<JudgedCoverage>,
    /// Per-run diagnostics
    pub runs: Vec<RunCheck>,
}

/// Format a check report.
pub fn format_check(report: &CheckReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(report),
        OutputMode::Human => format_check_human(report),
    }
}

fn format_check_human(report: &CheckReport) -> String {
    let mut out = String::new();
    let q = &report.qrels;
    let _ = writeln!(out, "=== Qrels ==={}", skipped_note(&report.qrels_load));
    let _ = writeln!(out, "  topics:                   {}", q.topic_count);
    let _ = writeln!(out, "  judgments:                {}", q.judgment_count);
    let _ = writeln!(
        out,
        "  relevant per topic:       min {} / mean {:.2} / max {}",
        q.min_relevant, q.mean_relevant, q.max_relevant
    );
    let _ = writeln!(out, "  topics with no relevant:  {}", q.topics_without_relevant);

    if let Some(cov) = &report.coverage {
        let _ = writeln!(out, "\n=== Collection ===");
        let _ = writeln!(out, "  judged documents:         {}", cov.judged_docs);
        let _ = writeln!(out, "  collection documents:     {}", cov.collection_docs);
        let _ = writeln!(
            out,
            "  missing judged documents: {} ({:.1}% covered)",
            cov.missing,
            cov.coverage() * 100.0
        );
        if !cov.missing_sample.is_empty() {
            let _ = writeln!(out, "  sample missing:           {:?}", cov.missing_sample);
        }
    }

    for run in &report.runs {
        let s = &run.summary;
        let o = &run.overlap;
        let _ = writeln!(
            out,
            "\n=== {} ({}) ==={}",
            s.tag,
            run.path.display(),
            skipped_note(&run.load)
        );
        let _ = writeln!(
            out,
            "  topics:                   {} ({} entries, depth {}..{})",
            s.topic_count, s.entry_count, s.min_depth, s.max_depth
        );
        let _ = writeln!(out, "  topics matching qrels:    {}", o.shared);
        if o.run_only > 0 {
            let _ = writeln!(
                out,
                "  not in qrels:             {} e.g. {:?}",
                o.run_only, o.run_only_sample
            );
        }
        if o.judged_only > 0 {
            let _ = writeln!(
                out,
                "  judged, not retrieved:    {} e.g. {:?}",
                o.judged_only, o.judged_only_sample
            );
        }
    }
    out
}
