use crate::types::{RetrievalDocument, SearchHit};

/// Turns text into fixed-size, L2-normalised vectors.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Ranked-retrieval service holding the projected documents.
///
/// `ranked_retrieve` returns hits ordered by descending score, at most
/// `top_k` of them, none scoring below `min_score`. Calls may block.
pub trait SimilarityBackend: Send + Sync {
    fn add(&self, documents: &[RetrievalDocument]) -> anyhow::Result<()>;
    fn ranked_retrieve(&self, query: &str, top_k: usize, min_score: f32) -> anyhow::Result<Vec<SearchHit>>;
}
