//! Question answering over a single document.
//!
//! `RetrievalEngine` wires the chunker, the vector index, the reranker and
//! the answer stream together. It starts `Empty`, becomes `Indexed` after the
//! first successful build, and every later build swaps in a new generation.
use serde::Serialize;
use std::sync::Arc;

use docqa_core::chunker::{Chunker, ChunkingConfig, DEFAULT_CHUNK_SIZE};
use docqa_core::config::{Settings, DEFAULT_FALLBACK_ANSWER, DEFAULT_TOP_K};
use docqa_core::document::has_text;
use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{ChunkId, Query};
use docqa_vector::{IndexState, VectorIndex};

pub mod rerank;
pub mod stream;

pub use rerank::{RankedCandidate, Reranker};
pub use stream::{stream_answer, AnswerStream};

pub type EngineState = IndexState;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub chunk_size: usize,
    pub top_k: usize,
    pub fallback_answer: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, top_k: DEFAULT_TOP_K, fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string() }
    }
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.chunking.size,
            top_k: settings.retrieval.top_k,
            fallback_answer: settings.retrieval.fallback_answer.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub generation: u64,
    pub chunks: usize,
    pub words: usize,
    pub dim: usize,
}

/// The selected answer. `chunk_id` and `score` are `None` for the fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub chunk_id: Option<ChunkId>,
    pub score: Option<f32>,
    pub generation: u64,
}

impl Answer {
    pub fn is_fallback(&self) -> bool { self.chunk_id.is_none() }

    /// A fresh token stream over the answer; call again to replay it.
    pub fn stream(&self) -> AnswerStream { AnswerStream::new(self.text.clone()) }

    pub fn into_stream(self) -> AnswerStream { AnswerStream::new(self.text) }
}

pub struct RetrievalEngine {
    chunker: Chunker,
    index: VectorIndex,
    reranker: Reranker,
    top_k: usize,
    fallback_answer: String,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, options: EngineOptions) -> Result<Self> {
        if options.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be greater than 0".to_string()));
        }
        Ok(Self {
            chunker: Chunker::new(ChunkingConfig::new(options.chunk_size)?),
            index: VectorIndex::new(embedder),
            reranker: Reranker::new(),
            top_k: options.top_k,
            fallback_answer: options.fallback_answer,
        })
    }

    pub fn from_settings(embedder: Arc<dyn Embedder>, settings: &Settings) -> Result<Self> {
        Self::new(embedder, EngineOptions::from(settings))
    }

    pub fn state(&self) -> EngineState { self.index.state() }
    pub fn top_k(&self) -> usize { self.top_k }
    pub fn chunk_size(&self) -> usize { self.chunker.config().words_per_chunk() }
    pub fn index(&self) -> &VectorIndex { &self.index }

    /// Chunk the extracted text and replace the live index with it.
    #[tracing::instrument(skip(self, raw_text), fields(bytes = raw_text.len()))]
    pub async fn build_from_document(&self, raw_text: &str) -> Result<BuildSummary> {
        if !has_text(raw_text) {
            return Err(Error::EmptyCorpus);
        }
        let chunks = self.chunker.chunk(raw_text);
        let words = chunks.iter().map(|c| c.word_count()).sum();
        let generation = self.index.build(chunks).await?;
        Ok(BuildSummary { generation: generation.id(), chunks: generation.len(), words, dim: generation.dim() })
    }

    /// Answer from the chunk that scores best among the top-k candidates.
    ///
    /// Search and rerank run against one snapshot, so a concurrent build
    /// cannot mix generations within a single ask.
    #[tracing::instrument(skip(self, question), fields(chars = question.len()))]
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let generation = self.index.snapshot()?;
        if !has_text(question) {
            return Err(Error::EmptyQuery);
        }
        let vector = self.index.embed_query(question).await?;
        let query = Query { text: question.to_string(), vector };

        let hits = generation.search(&query.vector, self.top_k)?;
        let candidates = generation.candidates(&hits);
        let answer = match self.reranker.best(&candidates, &query) {
            Some(best) => Answer {
                text: best.chunk.text.clone(),
                chunk_id: Some(best.chunk.id),
                score: Some(best.rerank_score),
                generation: generation.id(),
            },
            None => Answer { text: self.fallback_answer.clone(), chunk_id: None, score: None, generation: generation.id() },
        };
        tracing::debug!(candidates = candidates.len(), chunk = ?answer.chunk_id, score = ?answer.score, "answer selected");
        Ok(answer)
    }
}
