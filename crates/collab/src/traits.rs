//! Collaborator contracts
//!
//! Lemmatization, translation, full-text search, embedding and nearest
//! neighbour search are provided by outside libraries or services. The
//! harness only sees them through these traits. Implementations are plain
//! values built by the caller and passed in; nothing here reaches for a
//! process-wide model or client.

use crate::records::TextRecord;
use clir_core::ClirResult;

/// Transforms the text of a record (tokenization, lemmatization, ...).
///
/// The returned record must carry the same `id`, byte for byte. Relevance
/// matching depends on it; [`crate::preprocess_all`] enforces it.
pub trait Preprocessor {
    /// Process one record
    fn process(&self, record: &TextRecord) -> ClirResult<TextRecord>;
}

/// Machine translation of query text
pub trait Translator {
    /// Translate `text` into the collection language
    fn translate(&self, text: &str) -> ClirResult<String>;
}

/// Full-text search over a corpus of records
pub trait LexicalSearch {
    /// Index a corpus, replacing anything indexed before
    fn index(&mut self, corpus: &[TextRecord]) -> ClirResult<()>;

    /// Top `top_n` `(doc_id, score)` pairs for a query, best first
    fn search(&self, query: &str, top_n: usize) -> ClirResult<Vec<(String, f64)>>;
}

/// Text embedding model
pub trait Embedder {
    /// Width of every produced vector
    fn dimension(&self) -> usize;

    /// One vector per input text, in input order
    fn embed(&self, texts: &[&str]) -> ClirResult<Vec<Vec<f32>>>;
}

/// Nearest neighbour search over a fixed set of corpus vectors
///
/// Hits are reported by row index into the corpus; mapping rows back to
/// document ids is the caller's job (see [`crate::AlignedVectors`]).
pub trait VectorSearch {
    /// Number of corpus vectors
    fn len(&self) -> usize;

    /// True when no vectors are indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top `top_n` `(row, similarity)` pairs per query, best first
    fn search(&self, queries: &[Vec<f32>], top_n: usize) -> ClirResult<Vec<Vec<(usize, f32)>>>;
}
