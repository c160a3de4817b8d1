//! CLIR - cross-lingual retrieval experiment harness
//!
//! Combines ranked runs from a lexical and a dense retriever into a hybrid
//! run, and scores any run against graded relevance judgments.
//!
//! # Quick Start
//!
//! ```ignore
//! use clir::{fuse, evaluate, load_qrels, load_run, ParseMode};
//!
//! let (bm25, _) = load_run("bm25.trec".as_ref(), ParseMode::Lenient)?;
//! let (dense, _) = load_run("dense.trec".as_ref(), ParseMode::Lenient)?;
//! let hybrid = fuse(&bm25, &dense, 0.7)?;
//!
//! let (qrels, _) = load_qrels("qrels.txt".as_ref(), ParseMode::Lenient)?;
//! let report = evaluate(&hybrid, &qrels)?;
//! ```
//!
//! # Architecture
//!
//! - `clir-core`: runs, judgments, file formats, config, errors
//! - `clir-fusion`: score normalization and fusion
//! - `clir-metrics`: metrics, evaluation, diagnostics
//! - `clir-collab`: contracts for preprocessing, translation, search, embedding

pub use clir_collab::*;
pub use clir_core::*;
pub use clir_fusion::*;
pub use clir_metrics::*;
