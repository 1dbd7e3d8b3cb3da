//! In-memory vector index over one document's chunks.
//!
//! Search is an exact linear scan (inner product over unit vectors). The
//! index is rebuilt as a whole; there are no incremental updates.

pub mod embed;
pub mod generation;
pub mod index;
pub mod similarity;

pub use generation::{Candidate, IndexGeneration};
pub use index::{IndexState, VectorIndex};
