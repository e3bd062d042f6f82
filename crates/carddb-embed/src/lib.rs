//! carddb-embed
//!
//! Deterministic feature-hashing embedder. Each token is hashed into one of
//! `dim` buckets; the bag is L2-normalised so cosine similarity reduces to a
//! dot product. Needs no model files and gives identical vectors across runs.

use anyhow::{anyhow, Result};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use carddb_core::traits::Embedder;

pub mod tokenize;

pub use tokenize::tokenize;

pub struct HashEmbedder { dim: usize }

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 { return Err(anyhow!("embedding dimension must be at least 1")); }
        Ok(Self { dim })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in tokenize(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            // sign bit spreads collisions around zero
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub fn default_embedder(dim: usize) -> Result<Box<dyn Embedder>> {
    tracing::debug!(dim, "using hashing embedder");
    Ok(Box::new(HashEmbedder::new(dim)?))
}
