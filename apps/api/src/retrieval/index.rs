//! Ephemeral flat vector index, rebuilt for every request and dropped with it.

use std::cmp::Ordering;

use tracing::info;

use crate::document::Chunk;
use crate::retrieval::embedder::{Embedder, EmbeddingError};

struct IndexedChunk {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// A nearest-neighbour hit. Lower `distance` is more similar.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub chunk: &'a Chunk,
    pub distance: f32,
}

/// Exhaustive squared-L2 index over (vector, chunk) pairs, kept in insertion order.
#[derive(Default)]
pub struct VectorIndex {
    dimension: Option<usize>,
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds every chunk, one call per chunk, and indexes the results.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        request_id: &str,
    ) -> Result<Self, EmbeddingError> {
        let mut index = Self::new();
        for chunk in chunks {
            let vector = embedder.embed(&chunk.text).await?;
            index.insert(vector, chunk)?;
        }
        info!(
            "Embedded {} chunks ({} dims) for request {request_id}",
            index.len(),
            index.dimension.unwrap_or(0)
        );
        Ok(index)
    }

    pub fn insert(&mut self, vector: Vec<f32>, chunk: Chunk) -> Result<(), EmbeddingError> {
        if vector.is_empty() {
            return Err(EmbeddingError::EmptyVector);
        }
        let expected = *self.dimension.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        self.entries.push(IndexedChunk { vector, chunk });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns up to `k` chunks closest to `query`. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<'_>>, EmbeddingError> {
        if let Some(expected) = self.dimension {
            if query.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut hits: Vec<SearchHit<'_>> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                chunk: &entry.chunk,
                distance: squared_l2(&entry.vector, query),
            })
            .collect();

        // sort_by is stable
        hits.sort_by(|a, b| compare_distance(a.distance, b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// NaN sorts after every real distance.
fn compare_distance(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}
