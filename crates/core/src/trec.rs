//! TREC-style text codecs
//!
//! Three whitespace-separated formats are handled here:
//!
//! - **Run files** (read and written): `topic_id Q0 doc_id rank score method_tag`
//! - **Qrel files** (read only): `topic_id doc_id grade`, or the 4-column
//!   variant `topic_id <ignored> doc_id grade`
//! - **Identifier lists**: one id per line, aligned with an embedding matrix
//!
//! Line parsers return `MalformedResultLine` / `MalformedJudgmentLine`.
//! Loaders in [`ParseMode::Lenient`] log and skip those lines; in
//! [`ParseMode::Strict`] the first one aborts the load. A line that is not
//! valid UTF-8 counts as malformed.

use crate::error::{ClirError, ClirResult};
use crate::logging::targets;
use crate::qrels::{Judgment, RelevanceJudgments};
use crate::run::{RankedResultSet, DEFAULT_RUN_TAG};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Fixed placeholder in the second column of run files
pub const Q0: &str = "Q0";

/// How many skipped line numbers a [`LoadReport`] remembers
const SKIPPED_SAMPLE: usize = 10;

// ============================================================================
// Parse mode and load report
// ============================================================================

/// Handling of malformed lines during a file load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Log the line, skip it, keep going
    #[default]
    Lenient,
    /// Fail on the first malformed line
    Strict,
}

impl ParseMode {
    /// `Strict` when `strict` is set
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}

/// Outcome of loading a line-oriented file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Non-blank lines read
    pub lines_read: usize,
    /// Lines that produced a record
    pub accepted: usize,
    /// Malformed lines dropped
    pub skipped: usize,
    /// Line numbers of the first few dropped lines
    pub skipped_lines: Vec<usize>,
}

impl LoadReport {
    /// Account for a malformed line.
    ///
    /// In strict mode the error is returned; otherwise it is logged and the
    /// line number sampled.
    pub fn record_skip(&mut self, err: ClirError, line_no: usize, mode: ParseMode) -> ClirResult<()> {
        if mode == ParseMode::Strict {
            return Err(err);
        }
        warn!(target: targets::TREC, line_no, error = %err, "Skipping malformed line");
        self.skipped += 1;
        if self.skipped_lines.len() < SKIPPED_SAMPLE {
            self.skipped_lines.push(line_no);
        }
        Ok(())
    }
}

// ============================================================================
// Raw lines
// ============================================================================

/// Undecoded lines of a reader, numbered from 1, line ending stripped.
///
/// Unlike [`BufRead::lines`], bytes that are not UTF-8 do not end the
/// stream; each caller decides what such a line means.
pub struct RawLines<R> {
    reader: R,
    line_no: usize,
}

/// Iterate over the raw lines of `reader`
pub fn raw_lines<R: BufRead>(reader: R) -> RawLines<R> {
    RawLines { reader, line_no: 0 }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<(usize, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                self.line_no += 1;
                Some(Ok((self.line_no, buf)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// True for a line holding only ASCII whitespace
pub fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

// ============================================================================
// Run files
// ============================================================================

/// One parsed run-file line
#[derive(Debug, Clone, PartialEq)]
pub struct RunLine {
    /// Topic identifier
    pub topic_id: String,
    /// Document identifier
    pub doc_id: String,
    /// Rank as written by the producer
    pub rank: u32,
    /// Producer score
    pub score: f64,
    /// Method tag
    pub tag: String,
}

/// Parse one 6-column run line
pub fn parse_run_line(line_no: usize, line: &str) -> ClirResult<RunLine> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() != 6 {
        return Err(ClirError::malformed_result(
            line_no,
            line,
            format!("expected 6 columns, found {}", cols.len()),
        ));
    }
    if cols[1] != Q0 {
        return Err(ClirError::malformed_result(
            line_no,
            line,
            format!("expected literal {} in column 2, found {:?}", Q0, cols[1]),
        ));
    }
    let rank: u32 = cols[3]
        .parse()
        .map_err(|_| ClirError::malformed_result(line_no, line, format!("bad rank {:?}", cols[3])))?;
    let score: f64 = cols[4]
        .parse()
        .map_err(|_| ClirError::malformed_result(line_no, line, format!("bad score {:?}", cols[4])))?;
    if !score.is_finite() {
        return Err(ClirError::malformed_result(line_no, line, "score is not finite"));
    }

    Ok(RunLine {
        topic_id: cols[0].to_string(),
        doc_id: cols[2].to_string(),
        rank,
        score,
        tag: cols[5].to_string(),
    })
}

/// Read a run file.
///
/// Each topic is ordered by the file's rank column (stable for equal ranks),
/// repeated documents keep their best position, and ranks are renumbered
/// `1..=N`. The tag of the first accepted line becomes the set's tag.
pub fn read_run<R: BufRead>(reader: R, mode: ParseMode) -> ClirResult<(RankedResultSet, LoadReport)> {
    let mut report = LoadReport::default();
    let mut tag: Option<String> = None;
    let mut grouped: BTreeMap<String, Vec<(u32, String, f64)>> = BTreeMap::new();

    for raw in raw_lines(reader) {
        let (line_no, bytes) = raw?;
        if is_blank(&bytes) {
            continue;
        }
        report.lines_read += 1;

        let parsed = String::from_utf8(bytes)
            .map_err(|e| {
                let text = String::from_utf8_lossy(e.as_bytes());
                ClirError::malformed_result(line_no, &text, "line is not valid UTF-8")
            })
            .and_then(|line| parse_run_line(line_no, &line));
        match parsed {
            Ok(parsed) => {
                report.accepted += 1;
                if tag.is_none() {
                    tag = Some(parsed.tag.clone());
                }
                grouped
                    .entry(parsed.topic_id)
                    .or_default()
                    .push((parsed.rank, parsed.doc_id, parsed.score));
            }
            Err(err) => report.record_skip(err, line_no, mode)?,
        }
    }

    let mut run = RankedResultSet::new(tag.unwrap_or_else(|| DEFAULT_RUN_TAG.to_string()));
    for (topic_id, mut rows) in grouped {
        rows.sort_by_key(|(rank, _, _)| *rank);
        let ordered = rows.into_iter().map(|(_, doc, score)| (doc, score)).collect();
        run.insert_ordered(topic_id, ordered);
    }

    Ok((run, report))
}

/// Load a run file from disk
pub fn load_run(path: &Path, mode: ParseMode) -> ClirResult<(RankedResultSet, LoadReport)> {
    let file = File::open(path)?;
    let (run, report) = read_run(BufReader::new(file), mode)?;
    info!(
        target: targets::TREC,
        path = %path.display(),
        topic_count = run.topic_count(),
        doc_count = run.entry_count(),
        skipped = report.skipped,
        "Loaded run"
    );
    Ok((run, report))
}

/// Write a run in 6-column format, topics ascending, entries in rank order
pub fn write_run<W: Write>(run: &RankedResultSet, mut writer: W) -> ClirResult<()> {
    for (topic_id, entries) in run.topics() {
        for entry in entries {
            writeln!(
                writer,
                "{} {} {} {} {:.6} {}",
                topic_id,
                Q0,
                entry.doc_id,
                entry.rank,
                entry.score,
                run.tag()
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write a run file to disk, creating parent directories as needed
pub fn save_run(run: &RankedResultSet, path: &Path) -> ClirResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_run(run, BufWriter::new(file))?;
    info!(
        target: targets::TREC,
        path = %path.display(),
        topic_count = run.topic_count(),
        doc_count = run.entry_count(),
        "Saved run"
    );
    Ok(())
}

// ============================================================================
// Qrel files
// ============================================================================

/// Parse one 3- or 4-column judgment line
pub fn parse_judgment_line(line_no: usize, line: &str) -> ClirResult<Judgment> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    let (topic_id, doc_id, grade) = match cols.as_slice() {
        [topic, doc, grade] => (*topic, *doc, *grade),
        [topic, _, doc, grade] => (*topic, *doc, *grade),
        _ => {
            return Err(ClirError::malformed_judgment(
                line_no,
                line,
                format!("expected 3 or 4 columns, found {}", cols.len()),
            ))
        }
    };
    let grade: u32 = grade.parse().map_err(|_| {
        ClirError::malformed_judgment(
            line_no,
            line,
            format!("relevance {:?} is not a non-negative integer", grade),
        )
    })?;
    Ok(Judgment::new(topic_id, doc_id, grade))
}

/// Read a qrel file
pub fn read_qrels<R: BufRead>(reader: R, mode: ParseMode) -> ClirResult<(RelevanceJudgments, LoadReport)> {
    let mut report = LoadReport::default();
    let mut judgments = Vec::new();

    for raw in raw_lines(reader) {
        let (line_no, bytes) = raw?;
        if is_blank(&bytes) {
            continue;
        }
        report.lines_read += 1;

        let parsed = String::from_utf8(bytes)
            .map_err(|e| {
                let text = String::from_utf8_lossy(e.as_bytes());
                ClirError::malformed_judgment(line_no, &text, "line is not valid UTF-8")
            })
            .and_then(|line| parse_judgment_line(line_no, &line));
        match parsed {
            Ok(j) => {
                report.accepted += 1;
                judgments.push(j);
            }
            Err(err) => report.record_skip(err, line_no, mode)?,
        }
    }

    Ok((RelevanceJudgments::from_judgments(judgments), report))
}

/// Load a qrel file from disk
pub fn load_qrels(path: &Path, mode: ParseMode) -> ClirResult<(RelevanceJudgments, LoadReport)> {
    let file = File::open(path)?;
    let (qrels, report) = read_qrels(BufReader::new(file), mode)?;
    info!(
        target: targets::TREC,
        path = %path.display(),
        topic_count = qrels.topic_count(),
        judgments = qrels.judgment_count(),
        skipped = report.skipped,
        "Loaded qrels"
    );
    Ok((qrels, report))
}

// ============================================================================
// Identifier lists
// ============================================================================

/// Read one identifier per line, trimmed, blank lines skipped.
///
/// Rows must stay aligned with an embedding matrix, so an id that is not
/// valid UTF-8 is kept with replacement characters and logged.
pub fn read_id_list<R: BufRead>(reader: R) -> ClirResult<Vec<String>> {
    let mut ids = Vec::new();
    for raw in raw_lines(reader) {
        let (line_no, bytes) = raw?;
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                warn!(target: targets::TREC, line_no, "Identifier is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let id = line.trim();
        if !id.is_empty() {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Load an identifier list from disk
pub fn load_id_list(path: &Path) -> ClirResult<Vec<String>> {
    let file = File::open(path)?;
    read_id_list(BufReader::new(file))
}

// ============================================================================
// Tests
// ============================================================================
