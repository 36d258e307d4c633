//! Multi-query retrieval: runs each topical query against the index and keeps the first
//! few hits overall.

use serde::Serialize;
use tracing::debug;

use crate::document::Chunk;
use crate::retrieval::embedder::{Embedder, EmbeddingError};
use crate::retrieval::index::VectorIndex;

/// Topical queries issued, in this order, against every resume.
pub const DEFAULT_QUERIES: [&str; 3] = [
    "work experience and accomplishments",
    "skills and qualifications",
    "formatting and presentation issues",
];

pub const DEFAULT_RESULTS_PER_QUERY: usize = 3;
pub const DEFAULT_MAX_CONTEXT_SECTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    /// 0-based position within the hit list of the query that produced it.
    pub rank: usize,
    pub distance: f32,
    pub query: String,
}

/// Queries are issued sequentially. Hit lists are concatenated in query order without
/// deduplication, then cut to `limit` entries.
pub async fn retrieve_context(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    queries: &[String],
    k: usize,
    limit: usize,
) -> Result<Vec<RetrievalResult>, EmbeddingError> {
    let mut results = Vec::new();

    for query in queries {
        let query_vector = embedder.embed(query).await?;
        let hits = index.search(&query_vector, k)?;
        debug!("Query {query:?} retrieved {} chunks", hits.len());

        results.extend(hits.into_iter().enumerate().map(|(rank, hit)| RetrievalResult {
            chunk: hit.chunk.clone(),
            rank,
            distance: hit.distance,
            query: query.clone(),
        }));
    }

    results.truncate(limit);
    Ok(results)
}

/// Renders results as numbered sections for the prompt: `Section 1:\n<text>`, blank-line separated.
pub fn format_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Section {}:\n{}", i + 1, r.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
