//! Embedding backends for the `docqa_core::traits::Embedder` capability.
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_core::config::{expand_path, EmbeddingBackend, EmbeddingSettings};
use docqa_core::traits::Embedder;

pub mod device;
pub mod hash;
pub mod pool;
pub mod sentence;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use pool::masked_mean_l2;
pub use sentence::SentenceEmbedder;

/// Build the configured backend. `APP_USE_FAKE_EMBEDDINGS=1` forces the
/// hashing embedder regardless of settings.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake || settings.backend == EmbeddingBackend::Hash {
        tracing::info!(dim = settings.hash_dim, "using hashing embedder");
        return Ok(Arc::new(HashEmbedder::new(settings.hash_dim)));
    }
    let model_dir = resolve_model_dir(settings)?;
    Ok(Arc::new(SentenceEmbedder::load(&model_dir, settings.max_len)?))
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    if let Some(dir) = settings.model_dir.as_deref() {
        let p = expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(anyhow!("Configured embedding.model_dir does not exist: {}", p.display()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() { tracing::info!(var, dir = %p.display(), "model dir from env"); return Ok(p); }
        }
    }
    for candidate in ["models/bge-m3", "../models/bge-m3"] {
        let p = Path::new(candidate);
        if p.exists() { return Ok(p.to_path_buf()); }
    }
    Err(anyhow!("Could not locate the embedding model directory; set embedding.model_dir or APP_MODEL_DIR"))
}
