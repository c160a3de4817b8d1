//! Identifier/vector alignment and exact inner-product search
//!
//! Vector search reports hits by row. The row only means something through
//! the identifier list it was built alongside, so [`AlignedVectors`] refuses
//! to exist unless both lists have the same length and every vector has the
//! same width.

use crate::records::TextRecord;
use crate::traits::{Embedder, VectorSearch};
use clir_core::logging::targets;
use clir_core::{ClirError, ClirResult};
use tracing::{debug, info};

// ============================================================================
// Vector math
// ============================================================================

/// Dot product (inner product)
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm (Euclidean length)
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length in place; zero vectors are left as they are
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

// ============================================================================
// AlignedVectors
// ============================================================================

/// Identifiers paired row-for-row with fixed-width vectors
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVectors {
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl AlignedVectors {
    /// Pair identifiers with vectors.
    ///
    /// # Errors
    ///
    /// - `IdentifierCardinalityMismatch` when the counts differ
    /// - `DimensionMismatch` when a vector is wider or narrower than the first
    pub fn new(ids: Vec<String>, vectors: Vec<Vec<f32>>) -> ClirResult<Self> {
        if ids.len() != vectors.len() {
            return Err(ClirError::IdentifierCardinalityMismatch {
                identifiers: ids.len(),
                vectors: vectors.len(),
            });
        }
        let dimension = vectors.first().map_or(0, Vec::len);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(ClirError::DimensionMismatch {
                expected: dimension,
                found: bad.len(),
            });
        }
        debug!(target: targets::COLLAB, count = ids.len(), dimension, "Aligned vectors");
        Ok(AlignedVectors {
            ids,
            vectors,
            dimension,
        })
    }

    /// Identifier for a row
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` for a row past the end.
    pub fn id(&self, index: usize) -> ClirResult<&str> {
        self.ids
            .get(index)
            .map(String::as_str)
            .ok_or(ClirError::IndexOutOfRange {
                index,
                len: self.ids.len(),
            })
    }

    /// All identifiers in row order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// All vectors in row order
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Vector width (0 when empty)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Embed records and pair the vectors with the record ids.
///
/// # Errors
///
/// `IdentifierCardinalityMismatch` if the embedder returns a different number
/// of vectors than it was given texts; `DimensionMismatch` if any vector does
/// not match the embedder's declared width.
pub fn embed_records<E>(embedder: &E, records: &[TextRecord]) -> ClirResult<AlignedVectors>
where
    E: Embedder + ?Sized,
{
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    let vectors = embedder.embed(&texts)?;
    let ids = records.iter().map(|r| r.id.clone()).collect();
    let aligned = AlignedVectors::new(ids, vectors)?;
    if !aligned.is_empty() && aligned.dimension() != embedder.dimension() {
        return Err(ClirError::DimensionMismatch {
            expected: embedder.dimension(),
            found: aligned.dimension(),
        });
    }
    Ok(aligned)
}

// ============================================================================
// FlatIpIndex
// ============================================================================

/// Exact inner-product search over L2-normalized vectors.
///
/// Corpus and query vectors are normalized, so the score is cosine
/// similarity in `[-1, 1]`. Every query is compared against every row.
/// Results are sorted by score descending, ties by row ascending.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    rows: Vec<Vec<f32>>,
    dimension: usize,
}

impl FlatIpIndex {
    /// Build from corpus vectors
    pub fn new(corpus: &AlignedVectors) -> Self {
        let rows: Vec<Vec<f32>> = corpus
            .vectors()
            .iter()
            .map(|v| {
                let mut row = v.clone();
                l2_normalize(&mut row);
                row
            })
            .collect();
        info!(
            target: targets::COLLAB,
            rows = rows.len(),
            dimension = corpus.dimension(),
            "Built flat inner-product index"
        );
        FlatIpIndex {
            rows,
            dimension: corpus.dimension(),
        }
    }

    /// Vector width
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top `k` rows for one query
    pub fn search_one(&self, query: &[f32], k: usize) -> ClirResult<Vec<(usize, f32)>> {
        if query.len() != self.dimension && !self.rows.is_empty() {
            return Err(ClirError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }
        let mut q = query.to_vec();
        l2_normalize(&mut q);

        let mut results: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, v)| (row, dot_product(&q, v)))
            .collect();

        // Score desc, then row asc
        results.sort_by(|(row_a, score_a), (row_b, score_b)| {
            score_b.total_cmp(score_a).then(row_a.cmp(row_b))
        });
        results.truncate(k);
        Ok(results)
    }
}

impl VectorSearch for FlatIpIndex {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn search(&self, queries: &[Vec<f32>], top_n: usize) -> ClirResult<Vec<Vec<(usize, f32)>>> {
        queries.iter().map(|q| self.search_one(q, top_n)).collect()
    }
}
