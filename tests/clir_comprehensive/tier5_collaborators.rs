//! Tier 5: Collaborator Boundary
//!
//! Toy preprocessing, translation, lexical search and embedding plugged in
//! through the collaborator traits. The harness must keep identifiers intact
//! end to end and reject misaligned output.

use crate::test_utils::*;
use clir::{
    dense_run, embed_records, evaluate, fuse, lexical_run, preprocess_all, read_records,
    AlignedVectors, ClirError, ClirResult, Embedder, FlatIpIndex, LexicalSearch, Metric,
    ParseMode, PolicyTranslator, Preprocessor, TextRecord, TranslateErrorPolicy, Translator,
    VectorSearch,
};
use std::collections::HashMap;
use std::io::Cursor;

// ============================================================================
// Toy collaborators
// ============================================================================

struct Lowercase;

impl Preprocessor for Lowercase {
    fn process(&self, record: &TextRecord) -> ClirResult<TextRecord> {
        Ok(TextRecord::new(record.id.clone(), record.text.to_lowercase()))
    }
}

/// Drops hyphens from ids
struct IdMangler;

impl Preprocessor for IdMangler {
    fn process(&self, record: &TextRecord) -> ClirResult<TextRecord> {
        Ok(TextRecord::new(record.id.replace('-', ""), record.text.clone()))
    }
}

/// Word-for-word dictionary; unknown words are a failure
struct Dictionary(HashMap<&'static str, &'static str>);

impl Dictionary {
    fn new() -> Self {
        Dictionary(HashMap::from([
            ("hund", "dog"),
            ("katze", "cat"),
            ("fisch", "fish"),
        ]))
    }
}

impl Translator for Dictionary {
    fn translate(&self, text: &str) -> ClirResult<String> {
        text.split_whitespace()
            .map(|w| {
                self.0.get(w).map(|t| t.to_string()).ok_or_else(|| {
                    ClirError::InvalidConfig(format!("no entry for {w}"))
                })
            })
            .collect::<ClirResult<Vec<_>>>()
            .map(|words| words.join(" "))
    }
}

/// Counts query words occurring in each document
#[derive(Default)]
struct WordCount {
    corpus: Vec<TextRecord>,
}

impl LexicalSearch for WordCount {
    fn index(&mut self, corpus: &[TextRecord]) -> ClirResult<()> {
        self.corpus = corpus.to_vec();
        Ok(())
    }

    fn search(&self, query: &str, top_n: usize) -> ClirResult<Vec<(String, f64)>> {
        let mut hits: Vec<(String, f64)> = self
            .corpus
            .iter()
            .map(|doc| {
                let n = query
                    .split_whitespace()
                    .filter(|w| doc.text.split_whitespace().any(|d| d == *w))
                    .count();
                (doc.id.clone(), n as f64)
            })
            .filter(|(_, n)| *n > 0.0)
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.truncate(top_n);
        Ok(hits)
    }
}

/// One dimension per known word, counting occurrences
struct BagOfWords {
    vocab: Vec<&'static str>,
}

impl Embedder for BagOfWords {
    fn dimension(&self) -> usize {
        self.vocab.len()
    }

    fn embed(&self, texts: &[&str]) -> ClirResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.vocab
                    .iter()
                    .map(|v| t.split_whitespace().filter(|w| w == v).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Returns fewer vectors than texts
struct Lossy;

impl Embedder for Lossy {
    fn dimension(&self) -> usize {
        2
    }

    fn embed(&self, texts: &[&str]) -> ClirResult<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

const DOCS: &str = r#"{"id": "doc-1", "text": "The dog chased the cat"}
{"id": "doc-2", "text": "A cat sat"}
{"id": "doc-3", "text": "Fish swim"}
"#;

const TOPICS: &str = r#"{"topic_id": "T1", "text": "hund katze"}
{"topic_id": "T2", "text": "fisch"}
"#;

fn corpus() -> Vec<TextRecord> {
    let (docs, _) = read_records(Cursor::new(DOCS), ParseMode::Strict).unwrap();
    preprocess_all(&Lowercase, &docs).unwrap()
}

fn translated_topics() -> Vec<TextRecord> {
    let (topics, _) = read_records(Cursor::new(TOPICS), ParseMode::Strict).unwrap();
    PolicyTranslator::new(Dictionary::new(), TranslateErrorPolicy::Fail)
        .translate_records(&topics)
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_tier5_preprocessing_keeps_ids() {
    let docs = corpus();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-1", "doc-2", "doc-3"]);
    assert_eq!(docs[0].text, "the dog chased the cat");
}

#[test]
fn test_tier5_changed_id_rejected() {
    let (docs, _) = read_records(Cursor::new(DOCS), ParseMode::Strict).unwrap();
    let err = preprocess_all(&IdMangler, &docs).unwrap_err();
    assert!(matches!(
        err,
        ClirError::IdentifierChanged { ref expected, ref actual }
            if expected == "doc-1" && actual == "doc1"
    ));
}

#[test]
fn test_tier5_translation_policies() {
    let topics = translated_topics();
    assert_eq!(topics[0].id, "T1");
    assert_eq!(topics[0].text, "dog cat");

    let keep = PolicyTranslator::new(Dictionary::new(), TranslateErrorPolicy::KeepOriginal);
    assert_eq!(keep.translate("vogel").unwrap(), "vogel");

    let fail = PolicyTranslator::new(Dictionary::new(), TranslateErrorPolicy::Fail);
    assert!(matches!(
        fail.translate("vogel"),
        Err(ClirError::Translation { .. })
    ));
}

#[test]
fn test_tier5_lexical_run() {
    let mut engine = WordCount::default();
    engine.index(&corpus()).unwrap();

    let run = lexical_run(&engine, &translated_topics(), 10, "BM25_Elastic").unwrap();
    assert_eq!(run.tag(), "BM25_Elastic");
    // doc-1 has both words, doc-2 one.
    assert_eq!(run.doc_ids("T1"), vec!["doc-1", "doc-2"]);
    assert_eq!(run.doc_ids("T2"), vec!["doc-3"]);
}

#[test]
fn test_tier5_dense_run_maps_rows_to_ids() {
    let embedder = BagOfWords {
        vocab: vec!["dog", "cat", "fish"],
    };
    let docs = embed_records(&embedder, &corpus()).unwrap();
    let queries = embed_records(&embedder, &translated_topics()).unwrap();
    let index = FlatIpIndex::new(&docs);
    assert_eq!(index.len(), 3);

    let run = dense_run(&index, &queries, &docs, 2, "CLIR_Project").unwrap();
    assert_eq!(run.doc_ids("T1")[0], "doc-1");
    assert_eq!(run.doc_ids("T2")[0], "doc-3");
    assert_eq!(run.topic("T1").unwrap().len(), 2);
}

#[test]
fn test_tier5_misaligned_embeddings_rejected() {
    let err = embed_records(&Lossy, &corpus()).unwrap_err();
    assert!(matches!(
        err,
        ClirError::IdentifierCardinalityMismatch {
            identifiers: 3,
            vectors: 2
        }
    ));
}

#[test]
fn test_tier5_index_and_ids_out_of_step() {
    let small = AlignedVectors::new(vec!["a".into()], vec![vec![1.0, 0.0]]).unwrap();
    let large = AlignedVectors::new(
        vec!["a".into(), "b".into()],
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
    )
    .unwrap();
    let index = FlatIpIndex::new(&large);

    let err = dense_run(&index, &small, &small, 5, "x").unwrap_err();
    assert!(matches!(err, ClirError::IdentifierCardinalityMismatch { .. }));
}

#[test]
fn test_tier5_collaborator_runs_fuse_and_evaluate() {
    let docs = corpus();
    let topics = translated_topics();

    let mut engine = WordCount::default();
    engine.index(&docs).unwrap();
    let lexical = lexical_run(&engine, &topics, 10, "BM25_Elastic").unwrap();

    let embedder = BagOfWords {
        vocab: vec!["dog", "cat", "fish"],
    };
    let doc_vecs = embed_records(&embedder, &docs).unwrap();
    let query_vecs = embed_records(&embedder, &topics).unwrap();
    let dense = dense_run(&FlatIpIndex::new(&doc_vecs), &query_vecs, &doc_vecs, 10, "CLIR_Project")
        .unwrap();

    let hybrid = fuse(&lexical, &dense, 0.7).unwrap();
    let qrels = make_qrels(&[("T1", "doc-1", 2), ("T1", "doc-2", 1), ("T2", "doc-3", 1)]);
    let eval = evaluate(&hybrid, &qrels).unwrap();

    assert_eq!(eval.topics_scored, 2);
    assert!(approx(eval.mean(Metric::ReciprocalRank).unwrap(), 1.0));
}
