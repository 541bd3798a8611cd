//! Similarity query engine: scores every stored document against a query
//! vector, filters by the relevance threshold, ranks, and annotates the
//! survivors with snippets and matched terms.

use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

use crate::document::Document;
use crate::store::index::VectorIndex;
use crate::text;

/// Minimum cosine similarity for a document to appear in results.
/// Scores equal to the threshold are discarded.
pub const RELEVANCE_THRESHOLD: f32 = 0.3;

/// Errors for malformed queries.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("limit must be greater than zero")]
    InvalidLimit,

    #[error("query dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A ranked search hit. Derived per query, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: Document,
    /// Cosine similarity in [-1, 1]; always above [`RELEVANCE_THRESHOLD`]
    /// for returned results.
    pub score: f32,
    /// Excerpt of the content around the first matched query term.
    pub snippet: String,
    /// Lowercased query tokens that occur in the content.
    pub matched_terms: Vec<String>,
}

/// Exact brute-force search: O(n * D) over the live corpus, which is the
/// right trade at personal-corpus scale.
pub(crate) fn execute(
    documents: &[Document],
    index: &VectorIndex,
    query_vector: &[f32],
    query_text: &str,
    limit: usize,
) -> Result<Vec<SearchResult>, QueryError> {
    if limit == 0 {
        return Err(QueryError::InvalidLimit);
    }
    if query_vector.len() != index.dimensions() {
        return Err(QueryError::DimensionMismatch {
            expected: index.dimensions(),
            got: query_vector.len(),
        });
    }

    // Score in parallel but collect in insertion order, so the stable
    // sort below breaks ties deterministically.
    let mut scored: Vec<(usize, f32)> = documents
        .par_iter()
        .enumerate()
        .filter_map(|(position, document)| {
            let embedding = index.get(&document.id)?;
            let score = cosine_similarity(query_vector, embedding);
            (score > RELEVANCE_THRESHOLD).then_some((position, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(limit);

    let terms = text::tokenize(query_text);

    Ok(scored
        .into_iter()
        .map(|(position, score)| {
            let document = documents[position].clone();
            let snippet = text::snippet(&document.content, &terms);
            let matched_terms = text::matched_terms(&document.content, &terms);
            SearchResult {
                document,
                score,
                snippet,
                matched_terms,
            }
        })
        .collect())
}

/// Cosine similarity, defined as 0.0 when either vector has (near-)zero
/// magnitude. That guard is scoring policy: degenerate vectors lose to
/// the relevance threshold instead of raising an error.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
