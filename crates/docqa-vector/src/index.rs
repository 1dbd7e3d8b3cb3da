use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, SearchHit};

use crate::embed::encode_texts;
use crate::generation::IndexGeneration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IndexState {
    Empty,
    Indexed { generation: u64, chunks: usize },
}

/// Exact in-memory vector index holding one live generation.
///
/// Builds run one at a time and publish a finished generation with a single
/// pointer swap. Readers take an `Arc` snapshot and never observe a partial
/// build; a failed build leaves the previous generation in place.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    live: RwLock<Option<Arc<IndexGeneration>>>,
    build_lock: tokio::sync::Mutex<()>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, live: RwLock::new(None), build_lock: tokio::sync::Mutex::new(()) }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    /// Embed every chunk in one batch and replace the live generation.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<Arc<IndexGeneration>> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let _build = self.build_lock.lock().await;
        let start = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = encode_texts(Arc::clone(&self.embedder), texts).await?;

        let id = self.current().map_or(1, |g| g.id() + 1);
        let generation = Arc::new(IndexGeneration::new(id, chunks, vectors)?);
        self.publish(Arc::clone(&generation));
        tracing::info!(
            generation = id,
            chunks = generation.len(),
            dim = generation.dim(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index generation published"
        );
        Ok(generation)
    }

    /// Embed a single text with the index's embedder.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = encode_texts(Arc::clone(&self.embedder), vec![text.to_string()]).await?;
        vectors.pop().ok_or_else(|| Error::embedding(anyhow::anyhow!("embedder returned no vector")))
    }

    /// The live generation, for callers that need several reads against
    /// one consistent index.
    pub fn snapshot(&self) -> Result<Arc<IndexGeneration>> {
        self.current().ok_or(Error::NoIndex)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let generation = self.snapshot()?;
        let start = Instant::now();
        let hits = generation.search(query, k)?;
        tracing::debug!(generation = generation.id(), k, hits = hits.len(), elapsed_us = start.elapsed().as_micros() as u64, "searched");
        Ok(hits)
    }

    pub fn state(&self) -> IndexState {
        match self.current() {
            Some(g) => IndexState::Indexed { generation: g.id(), chunks: g.len() },
            None => IndexState::Empty,
        }
    }

    fn current(&self) -> Option<Arc<IndexGeneration>> {
        self.live.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn publish(&self, generation: Arc<IndexGeneration>) {
        *self.live.write().unwrap_or_else(PoisonError::into_inner) = Some(generation);
    }
}
