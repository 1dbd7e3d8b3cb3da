//! Domain types shared by the chunker, the vector index and the engine.

use serde::{Deserialize, Serialize};

/// Ordinal position of a chunk within its source document.
pub type ChunkId = usize;

/// A contiguous word window of the source document.
///
/// - `id`: 0-based position in document order
/// - `text`: the window's words joined by single spaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
}

impl Chunk {
    pub fn new(id: ChunkId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A question together with its embedding. Built per ask, never stored.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub vector: Vec<f32>,
}

/// One entry of a top-k search.
///
/// `chunk_id` matches `Chunk::id`. `score` is the inner product of the
/// normalized query and chunk vectors; higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub score: f32,
}
