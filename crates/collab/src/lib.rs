//! Collaborator boundary for the CLIR harness
//!
//! The harness does not lemmatize, translate, index or embed anything
//! itself. This crate defines the contracts those services are used through
//! and the checks applied at the boundary:
//! - records: `TextRecord`, JSONL loading, identifier-preserving preprocessing
//! - translate: translation with an explicit failure policy
//! - vectors: identifier/vector alignment, exact inner-product index
//! - runs: turning collaborator hits into ranked result sets

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod records;
pub mod runs;
pub mod traits;
pub mod translate;
pub mod vectors;

pub use records::{
    count_duplicate_ids, load_records, preprocess_all, read_records, write_records, TextRecord,
};
pub use runs::{dense_run, lexical_run, DEFAULT_DEPTH, DENSE_TAG, LEXICAL_TAG};
pub use traits::{Embedder, LexicalSearch, Preprocessor, Translator, VectorSearch};
pub use translate::PolicyTranslator;
pub use vectors::{
    dot_product, embed_records, l2_norm, l2_normalize, AlignedVectors, FlatIpIndex,
};
