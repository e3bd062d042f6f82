#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use carddb_core::catalog::{load_catalog, Catalog};
use carddb_core::traits::SimilarityBackend;
use carddb_core::types::{RetrievalDocument, SearchHit};
use carddb_search::{SearchEngine, SearchLimits};

pub const CATALOG: &str = r#"[
  {"id": "1", "name": "Marta Silva", "company": "CleanCo", "email": "marta@cleanco.pt", "phone": "+351 900",
   "city": "Lisbon", "services": ["cleaning"], "prices": {"cleaning": 50}},
  {"id": "2", "name": "Jonas Weber", "company": "CleanCo Plus", "email": "jonas@example.de", "phone": "",
   "city": "Berlin", "services": ["cleaning"], "prices": {}},
  {"id": "3", "name": "Ana Costa", "company": "FixIt", "email": "ana@fixit.pt", "phone": "+351 911",
   "city": "Porto", "services": ["Plumbing", "Cleaning "], "prices": {"plumbing": 80, "cleaning": 35}},
  {"id": "4", "name": "Rui Mendes", "company": "Sparks Lda", "email": "rui@sparks.pt", "phone": "",
   "city": "Lisbon", "services": ["electrical", "cleaning"], "prices": {"electrical": 120, "cleaning": 50}},
  {"id": "5", "name": "Lena Marx", "company": "Brush & Roll", "email": "lena@brush.de", "phone": "",
   "city": "Munich", "services": ["painting", "cleaning"], "prices": {"painting": 200, "cleaning": 120}}
]"#;

/// Backend answering every query with a fixed ranking, recording what it was asked.
#[derive(Default)]
pub struct ScriptedBackend {
    pub hits: Vec<SearchHit>,
    pub fail_retrieve: bool,
    pub fail_add: bool,
    pub add_calls: AtomicUsize,
    pub added: Mutex<Vec<RetrievalDocument>>,
    pub requests: Mutex<Vec<(String, usize, f32)>>,
}

impl ScriptedBackend {
    pub fn ranking(ids: &[&str]) -> Self {
        let hits = ids
            .iter()
            .enumerate()
            .map(|(i, id)| SearchHit { id: id.to_string(), score: 1.0 - i as f32 * 0.05 })
            .collect();
        Self { hits, ..Default::default() }
    }

    pub fn add_calls(&self) -> usize { self.add_calls.load(Ordering::SeqCst) }
}

impl SimilarityBackend for ScriptedBackend {
    fn add(&self, documents: &[RetrievalDocument]) -> anyhow::Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add { anyhow::bail!("backend unavailable"); }
        self.added.lock().unwrap().extend_from_slice(documents);
        Ok(())
    }

    fn ranked_retrieve(&self, query: &str, top_k: usize, min_score: f32) -> anyhow::Result<Vec<SearchHit>> {
        self.requests.lock().unwrap().push((query.to_string(), top_k, min_score));
        if self.fail_retrieve { anyhow::bail!("connection reset"); }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

pub fn catalog() -> Catalog { load_catalog(CATALOG.as_bytes()).expect("catalog") }

pub fn engine_with(backend: Arc<ScriptedBackend>) -> SearchEngine {
    SearchEngine::new(catalog(), backend, SearchLimits::default())
}

pub fn ids(records: &[&carddb_core::types::ProviderRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}
