//! Embedder calls run on the blocking pool and are validated before any
//! vector reaches the index.
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Instant;

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;

use crate::similarity::is_unit;

/// Allowed deviation of an embedding's L2 norm from 1.
pub const NORM_TOLERANCE: f32 = 1e-3;

pub async fn encode_texts(embedder: Arc<dyn Embedder>, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
    let expected = texts.len();
    let dim = embedder.dim();
    let start = Instant::now();
    let vectors = tokio::task::spawn_blocking(move || embedder.encode(&texts))
        .await
        .map_err(|e| Error::embedding(anyhow!("embedding task did not complete: {e}")))?
        .map_err(Error::Embedding)?;
    tracing::debug!(texts = expected, elapsed_ms = start.elapsed().as_millis() as u64, "embedder returned");
    validate_vectors(&vectors, expected, dim)?;
    Ok(vectors)
}

pub fn validate_vectors(vectors: &[Vec<f32>], expected: usize, dim: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(Error::embedding(anyhow!("embedder returned {} vectors for {} texts", vectors.len(), expected)));
    }
    for (i, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, actual: v.len() });
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(Error::embedding(anyhow!("vector {i} contains NaN or infinite values")));
        }
        if !is_unit(v, NORM_TOLERANCE) {
            return Err(Error::embedding(anyhow!("vector {i} is not L2-normalized")));
        }
    }
    Ok(())
}
