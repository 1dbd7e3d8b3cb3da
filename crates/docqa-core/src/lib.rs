#![deny(unused_variables)]

pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{chunk_text, Chunker, ChunkingConfig};
pub use error::{Error, Result};
pub use traits::Embedder;
pub use types::{Chunk, ChunkId, Query, SearchHit};
