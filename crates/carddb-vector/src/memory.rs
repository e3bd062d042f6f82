use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Ordering;
use std::sync::RwLock;
use tracing::{debug, info};

use carddb_core::traits::{Embedder, SimilarityBackend};
use carddb_core::types::{RetrievalDocument, SearchHit};

const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone)]
struct StoredDocument {
    document: RetrievalDocument,
    content_hash: String,
    vector: Vec<f32>,
}

/// In-process similarity backend: brute-force cosine over stored vectors.
///
/// `add` upserts by document id. A document whose text hash is unchanged is
/// not re-embedded, so pushing the same catalog twice leaves one copy.
pub struct MemoryVectorStore {
    embedder: Box<dyn Embedder>,
    entries: RwLock<Vec<StoredDocument>>,
    show_progress: bool,
}

impl MemoryVectorStore {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, entries: RwLock::new(Vec::new()), show_progress: false }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Stored copy of a document, if present.
    pub fn document(&self, id: &str) -> Option<RetrievalDocument> {
        let entries = self.entries.read().ok()?;
        entries.iter().find(|e| e.document.id == id).map(|e| e.document.clone())
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.show_progress { return Ok(ProgressBar::hidden()); }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")?
                .progress_chars("#>-"),
        );
        Ok(pb)
    }
}

fn content_hash(text: &str) -> String { blake3::hash(text.as_bytes()).to_hex().to_string() }

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

impl SimilarityBackend for MemoryVectorStore {
    fn add(&self, documents: &[RetrievalDocument]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("vector store lock poisoned"))?;

        let mut pending = Vec::new();
        for doc in documents {
            let hash = content_hash(&doc.text);
            match entries.iter_mut().find(|e| e.document.id == doc.id) {
                Some(existing) if existing.content_hash == hash => existing.document = doc.clone(),
                _ => pending.push((doc, hash)),
            }
        }
        debug!(received = documents.len(), changed = pending.len(), "memory store add");

        let pb = self.progress_bar(pending.len())?;
        for batch in pending.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|(d, _)| d.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(anyhow!("embedder returned {} vectors for {} texts", vectors.len(), batch.len()));
            }
            for ((doc, hash), vector) in batch.iter().zip(vectors) {
                let stored = StoredDocument { document: (*doc).clone(), content_hash: hash.clone(), vector };
                match entries.iter_mut().find(|e| e.document.id == doc.id) {
                    Some(existing) => *existing = stored,
                    None => entries.push(stored),
                }
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        info!(documents = entries.len(), "memory store ready");
        Ok(())
    }

    fn ranked_retrieve(&self, query: &str, top_k: usize, min_score: f32) -> Result<Vec<SearchHit>> {
        if top_k == 0 { return Ok(Vec::new()); }
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let entries = self.entries.read().map_err(|_| anyhow!("vector store lock poisoned"))?;

        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|e| SearchHit { id: e.document.id.clone(), score: dot(&q_vec, &e.vector) })
            .filter(|h| h.score >= min_score)
            .collect();
        // stable: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }
}
