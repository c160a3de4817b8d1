//! Core types for the CLIR experiment harness
//!
//! This crate defines the foundational types used throughout the workspace:
//! - RankedResultSet / ResultEntry: one retrieval run, per-topic rankings
//! - RelevanceJudgments: ground-truth graded relevance per (topic, document)
//! - TREC codecs: run files, qrel files (3- and 4-column), identifier lists
//! - ExperimentConfig: `clir.toml` loading and validation
//! - ClirError: error taxonomy shared by all crates
//! - logging: tracing targets and level parsing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod qrels;
pub mod run;
pub mod trec;

// Re-export commonly used types
pub use config::{
    EvaluationSection, ExperimentConfig, FusionMethod, FusionSection, MissingTopicPolicy,
    TranslateErrorPolicy, TranslationSection, CONFIG_FILE_NAME,
};
pub use error::{ClirError, ClirResult};
pub use qrels::{Judgment, QrelSummary, RelevanceJudgments};
pub use run::{RankedResultSet, ResultEntry, DEFAULT_RUN_TAG};
pub use trec::{
    is_blank, load_id_list, load_qrels, load_run, parse_judgment_line, parse_run_line, raw_lines,
    read_id_list, read_qrels, read_run, save_run, write_run, LoadReport, ParseMode, RawLines,
    RunLine, Q0,
};
