/// Text to vector capability.
///
/// Implementations must return exactly one L2-normalized vector of `dim()`
/// entries per input text, and must be deterministic for a given model.
/// Callers batch: a whole document is encoded in a single call.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn encode(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
