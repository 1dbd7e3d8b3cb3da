use std::path::PathBuf;

use docqa_core::traits::Embedder;
use docqa_embed::SentenceEmbedder;

fn main() -> anyhow::Result<()> {
    let model_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("models/bge-m3"));
    let embedder = SentenceEmbedder::load(&model_dir, 256)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.encode(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
