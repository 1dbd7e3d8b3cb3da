use crate::error::{Error, Result};
use crate::types::Chunk;

pub const DEFAULT_CHUNK_SIZE: usize = 300;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    words_per_chunk: usize,
}

impl ChunkingConfig {
    pub fn new(words_per_chunk: usize) -> Result<Self> {
        if words_per_chunk == 0 {
            return Err(Error::InvalidConfig("chunk size must be at least 1 word".to_string()));
        }
        Ok(Self { words_per_chunk })
    }

    pub fn words_per_chunk(&self) -> usize { self.words_per_chunk }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { words_per_chunk: DEFAULT_CHUNK_SIZE }
    }
}

/// Splits document text into fixed-size, non-overlapping word windows.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self { Self { config } }

    pub fn with_size(words_per_chunk: usize) -> Result<Self> {
        Ok(Self::new(ChunkingConfig::new(words_per_chunk)?))
    }

    pub fn config(&self) -> &ChunkingConfig { &self.config }

    /// Every window holds exactly `words_per_chunk` words except the last,
    /// which holds the remainder. Blank text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let chunks: Vec<Chunk> = words
            .chunks(self.config.words_per_chunk)
            .enumerate()
            .map(|(id, window)| Chunk::new(id, window.join(" ")))
            .collect();
        tracing::debug!(words = words.len(), chunks = chunks.len(), size = self.config.words_per_chunk, "chunked document");
        chunks
    }
}

pub fn chunk_text(text: &str, words_per_chunk: usize) -> Result<Vec<Chunk>> {
    Ok(Chunker::with_size(words_per_chunk)?.chunk(text))
}
