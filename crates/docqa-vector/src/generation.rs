use docqa_core::error::{Error, Result};
use docqa_core::types::{Chunk, SearchHit};

use crate::similarity::dot;

/// One immutable, fully built index.
///
/// `chunks[i]` and `vectors[i]` describe the same window, and `chunks[i].id == i`.
#[derive(Debug)]
pub struct IndexGeneration {
    id: u64,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

/// A search hit joined with the chunk and the vector stored for it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub chunk: &'a Chunk,
    pub vector: &'a [f32],
    pub score: f32,
}

impl IndexGeneration {
    pub fn new(id: u64, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if chunks.len() != vectors.len() {
            return Err(Error::InvalidArgument(format!("{} chunks but {} vectors", chunks.len(), vectors.len())));
        }
        if let Some((pos, chunk)) = chunks.iter().enumerate().find(|(pos, c)| c.id != *pos) {
            return Err(Error::InvalidArgument(format!("chunk at position {pos} has id {}", chunk.id)));
        }
        let dim = vectors[0].len();
        if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::DimensionMismatch { expected: dim, actual: v.len() });
        }
        Ok(Self { id, chunks, vectors, dim })
    }

    pub fn id(&self) -> u64 { self.id }
    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    pub fn chunk(&self, id: usize) -> Option<&Chunk> { self.chunks.get(id) }

    /// Exact top-`k` by inner product, one pass over all vectors.
    /// Equal scores keep document order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".to_string()));
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidArgument("query vector contains NaN or infinite values".to_string()));
        }
        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(chunk_id, v)| SearchHit { chunk_id, score: dot(query, v) })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }

    /// Resolve hits against this generation. Hits from another generation
    /// that point past the end are dropped.
    pub fn candidates(&self, hits: &[SearchHit]) -> Vec<Candidate<'_>> {
        hits.iter()
            .filter_map(|hit| {
                let chunk = self.chunks.get(hit.chunk_id)?;
                Some(Candidate { chunk, vector: &self.vectors[hit.chunk_id], score: hit.score })
            })
            .collect()
    }
}
