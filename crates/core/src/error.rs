//! Error types for the CLIR harness
//!
//! This module defines all error types used throughout the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Fatal errors (`InvalidWeight`, `EmptyQrels`, `IdentifierCardinalityMismatch`)
//! abort the operation that raised them. Line-level errors
//! (`MalformedJudgmentLine`, `MalformedResultLine`) are produced by the per-line
//! parsers; the file loaders log and skip them unless strict parsing is on.

use std::io;
use thiserror::Error;

/// Result type alias for CLIR operations
pub type ClirResult<T> = std::result::Result<T, ClirError>;

/// Error types for the CLIR harness
#[derive(Debug, Error)]
pub enum ClirError {
    /// Fusion weight outside `[0, 1]`
    #[error("Invalid fusion weight: alpha = {alpha}, expected a value in [0, 1]")]
    InvalidWeight {
        /// The rejected weight
        alpha: f64,
    },

    /// Evaluation requested against a judgment store with no topics
    #[error("Relevance judgments are empty: no topics to evaluate against")]
    EmptyQrels,

    /// A relevance judgment line did not parse
    #[error("Malformed judgment line {line_no}: {reason} (line: {line:?})")]
    MalformedJudgmentLine {
        /// 1-based line number in the source file
        line_no: usize,
        /// Raw line content
        line: String,
        /// What was wrong with it
        reason: String,
    },

    /// A ranked result line did not parse
    #[error("Malformed result line {line_no}: {reason} (line: {line:?})")]
    MalformedResultLine {
        /// 1-based line number in the source file
        line_no: usize,
        /// Raw line content
        line: String,
        /// What was wrong with it
        reason: String,
    },

    /// Identifier list and vector list have different lengths
    #[error("Identifier cardinality mismatch: {identifiers} identifiers for {vectors} vectors")]
    IdentifierCardinalityMismatch {
        /// Number of identifiers
        identifiers: usize,
        /// Number of vectors
        vectors: usize,
    },

    /// A collaborator returned a record under a different identifier
    #[error("Identifier changed across collaborator boundary: expected {expected:?}, got {actual:?}")]
    IdentifierChanged {
        /// Identifier that was sent
        expected: String,
        /// Identifier that came back
        actual: String,
    },

    /// Vectors of different widths
    #[error("Dimension mismatch: expected {expected}-dim vectors, found {found}-dim")]
    DimensionMismatch {
        /// Dimension established by the first vector or the index
        expected: usize,
        /// Offending dimension
        found: usize,
    },

    /// A vector search hit points past the identifier table
    #[error("Vector index {index} out of range for {len} identifiers")]
    IndexOutOfRange {
        /// Row index returned by the search
        index: usize,
        /// Number of known identifiers
        len: usize,
    },

    /// Translation failed and the policy says to fail
    #[error("Translation failed for {text:?}: {reason}")]
    Translation {
        /// Source text
        text: String,
        /// Underlying failure
        reason: String,
    },

    /// A ranked result set violates the rank invariant
    #[error("Invalid ranking for topic {topic_id}: {reason}")]
    InvalidRanking {
        /// Offending topic
        topic_id: String,
        /// Which part of the invariant failed
        reason: String,
    },

    /// Bad configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON decode/encode error
    #[error("JSON error: {0}")]
    Json(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ClirError {
    /// Build a `MalformedResultLine` error
    pub fn malformed_result(line_no: usize, line: &str, reason: impl Into<String>) -> Self {
        ClirError::MalformedResultLine {
            line_no,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// Build a `MalformedJudgmentLine` error
    pub fn malformed_judgment(line_no: usize, line: &str, reason: impl Into<String>) -> Self {
        ClirError::MalformedJudgmentLine {
            line_no,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that only concern a single input line
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            ClirError::MalformedJudgmentLine { .. } | ClirError::MalformedResultLine { .. }
        )
    }
}

impl From<serde_json::Error> for ClirError {
    fn from(e: serde_json::Error) -> Self {
        ClirError::Json(e.to_string())
    }
}
