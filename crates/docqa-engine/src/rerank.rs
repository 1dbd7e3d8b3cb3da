use docqa_core::types::{Chunk, Query};
use docqa_vector::similarity::dot;
use docqa_vector::Candidate;

/// A candidate after the second scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate<'a> {
    pub chunk: &'a Chunk,
    pub search_score: f32,
    pub rerank_score: f32,
}

/// Orders search candidates by similarity to the query and picks the best.
///
/// Scores come from the vectors cached alongside each candidate; the
/// embedder is never called here.
#[derive(Debug, Clone, Default)]
pub struct Reranker;

impl Reranker {
    pub fn new() -> Self { Self }

    /// All candidates, best first. Equal scores keep their input order.
    pub fn rank<'a>(&self, candidates: &[Candidate<'a>], query: &Query) -> Vec<RankedCandidate<'a>> {
        let mut ranked: Vec<RankedCandidate<'a>> = candidates
            .iter()
            .map(|c| RankedCandidate { chunk: c.chunk, search_score: c.score, rerank_score: dot(&query.vector, c.vector) })
            .collect();
        ranked.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));
        ranked
    }

    pub fn rerank<'a>(&self, candidates: &[Candidate<'a>], query: &Query) -> Option<&'a Chunk> {
        self.best(candidates, query).map(|r| r.chunk)
    }

    pub fn best<'a>(&self, candidates: &[Candidate<'a>], query: &Query) -> Option<RankedCandidate<'a>> {
        self.rank(candidates, query).into_iter().next()
    }
}
