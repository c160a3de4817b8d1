//! Identified text records and JSONL loading
//!
//! Documents are stored one JSON object per line as `{"id": ..., "text": ...}`;
//! topics use `topic_id` in place of `id`. Extra fields are ignored.

use crate::traits::Preprocessor;
use clir_core::logging::targets;
use clir_core::{is_blank, raw_lines, ClirError, ClirResult, LoadReport, ParseMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// A document or topic: stable identifier plus free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Identifier, never altered by any collaborator
    #[serde(alias = "topic_id", alias = "doc_id")]
    pub id: String,
    /// Text content
    pub text: String,
}

impl TextRecord {
    /// Create a new record
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        TextRecord {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Read JSONL records, skipping lines that are not a valid record.
///
/// Identifiers are trimmed. Lines are parsed from raw bytes, so invalid
/// UTF-8 is a JSON error like any other. In strict mode the first bad line
/// is an error.
pub fn read_records<R: BufRead>(
    reader: R,
    mode: ParseMode,
) -> ClirResult<(Vec<TextRecord>, LoadReport)> {
    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for raw in raw_lines(reader) {
        let (line_no, bytes) = raw?;
        if is_blank(&bytes) {
            continue;
        }
        report.lines_read += 1;

        match serde_json::from_slice::<TextRecord>(&bytes) {
            Ok(mut record) => {
                let trimmed = record.id.trim();
                if trimmed.len() != record.id.len() {
                    record.id = trimmed.to_string();
                }
                report.accepted += 1;
                records.push(record);
            }
            Err(e) => report.record_skip(ClirError::from(e), line_no, mode)?,
        }
    }

    Ok((records, report))
}

/// Load a JSONL record file from disk
pub fn load_records(path: &Path, mode: ParseMode) -> ClirResult<(Vec<TextRecord>, LoadReport)> {
    let file = File::open(path)?;
    let (records, report) = read_records(BufReader::new(file), mode)?;
    info!(
        target: targets::COLLAB,
        path = %path.display(),
        records = records.len(),
        skipped = report.skipped,
        "Loaded records"
    );
    Ok((records, report))
}

/// Write records as JSONL
pub fn write_records<W: Write>(records: &[TextRecord], mut writer: W) -> ClirResult<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Run every record through a preprocessor.
///
/// # Errors
///
/// `IdentifierChanged` as soon as the preprocessor returns a record whose
/// id differs from the one it was given; any preprocessor error is passed on.
pub fn preprocess_all<P>(preprocessor: &P, records: &[TextRecord]) -> ClirResult<Vec<TextRecord>>
where
    P: Preprocessor + ?Sized,
{
    records
        .iter()
        .map(|record| {
            let processed = preprocessor.process(record)?;
            if processed.id != record.id {
                return Err(ClirError::IdentifierChanged {
                    expected: record.id.clone(),
                    actual: processed.id,
                });
            }
            Ok(processed)
        })
        .collect()
}

/// Warn about repeated identifiers; returns how many were repeats
pub fn count_duplicate_ids(records: &[TextRecord]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    let mut duplicates = 0;
    for record in records {
        if !seen.insert(record.id.as_str()) {
            debug!(target: targets::COLLAB, id = %record.id, "Repeated record id");
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(target: targets::COLLAB, duplicates, "Records share identifiers");
    }
    duplicates
}
