//! Building ranked result sets from collaborator output

use crate::records::TextRecord;
use crate::traits::{LexicalSearch, VectorSearch};
use crate::vectors::AlignedVectors;
use clir_core::logging::targets;
use clir_core::{ClirError, ClirResult, RankedResultSet};
use tracing::info;

/// Tag for lexical runs
pub const LEXICAL_TAG: &str = "BM25_Elastic";

/// Tag for dense runs
pub const DENSE_TAG: &str = "CLIR_Project";

/// Default retrieval depth per topic
pub const DEFAULT_DEPTH: usize = 1000;

/// Query a lexical engine once per topic.
///
/// The engine must already hold the corpus. A topic with no hits is absent
/// from the result.
pub fn lexical_run<S>(
    search: &S,
    topics: &[TextRecord],
    top_n: usize,
    tag: &str,
) -> ClirResult<RankedResultSet>
where
    S: LexicalSearch + ?Sized,
{
    let mut run = RankedResultSet::new(tag);
    for topic in topics {
        let hits = search.search(&topic.text, top_n)?;
        run.insert_scored(topic.id.clone(), hits);
    }
    run.truncate(top_n);
    info!(
        target: targets::COLLAB,
        tag,
        topic_count = run.topic_count(),
        doc_count = run.entry_count(),
        "Built lexical run"
    );
    Ok(run)
}

/// Run vector search for every query and map rows back to document ids.
///
/// # Errors
///
/// - `IdentifierCardinalityMismatch` if the search returns a different number
///   of hit lists than there are queries
/// - `IndexOutOfRange` if a hit row has no document id
pub fn dense_run<S>(
    search: &S,
    queries: &AlignedVectors,
    corpus: &AlignedVectors,
    top_n: usize,
    tag: &str,
) -> ClirResult<RankedResultSet>
where
    S: VectorSearch + ?Sized,
{
    if search.len() != corpus.len() {
        return Err(ClirError::IdentifierCardinalityMismatch {
            identifiers: corpus.len(),
            vectors: search.len(),
        });
    }

    let hit_lists = search.search(queries.vectors(), top_n)?;
    if hit_lists.len() != queries.len() {
        return Err(ClirError::IdentifierCardinalityMismatch {
            identifiers: queries.len(),
            vectors: hit_lists.len(),
        });
    }

    let mut run = RankedResultSet::new(tag);
    for (topic_id, hits) in queries.ids().iter().zip(hit_lists) {
        let scored = hits
            .into_iter()
            .map(|(row, score)| Ok((corpus.id(row)?.to_string(), f64::from(score))))
            .collect::<ClirResult<Vec<_>>>()?;
        run.insert_scored(topic_id.clone(), scored);
    }
    run.truncate(top_n);

    info!(
        target: targets::COLLAB,
        tag,
        topic_count = run.topic_count(),
        doc_count = run.entry_count(),
        "Built dense run"
    );
    Ok(run)
}
