use std::path::Path;

use carddb_core::config::{BackendKind, Settings};
use carddb_core::traits::SimilarityBackend;
use carddb_core::types::{Meta, RetrievalDocument};
use carddb_embed::HashEmbedder;
use carddb_vector::{open_backend, MemoryVectorStore};

fn doc(id: &str, text: &str) -> RetrievalDocument {
    RetrievalDocument { id: id.to_string(), text: text.to_string(), metadata: Meta::new() }
}

fn store() -> MemoryVectorStore {
    MemoryVectorStore::new(Box::new(HashEmbedder::new(512).expect("embedder")))
}

#[test]
fn ranks_closest_document_first() {
    let store = store();
    store
        .add(&[
            doc("1", "Provider: Marta Company: CleanCo Services: cleaning windows"),
            doc("2", "Provider: Ana Company: FixIt Services: plumbing pipes leaks"),
            doc("3", "Provider: Rui Company: Sparks Services: electrical wiring"),
        ])
        .expect("add");

    let hits = store.ranked_retrieve("plumbing leaks", 3, 0.0).expect("retrieve");
    assert_eq!(hits[0].id, "2");
    for pair in hits.windows(2) { assert!(pair[0].score >= pair[1].score); }
}

#[test]
fn applies_min_score_and_top_k() {
    let store = store();
    store.add(&[doc("a", "cleaning"), doc("b", "cleaning"), doc("c", "roofing")]).expect("add");

    let hits = store.ranked_retrieve("cleaning", 1, 0.5).expect("retrieve");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a", "equal scores keep insertion order");

    let all = store.ranked_retrieve("cleaning", 10, 0.5).expect("retrieve");
    assert_eq!(all.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);

    assert!(store.ranked_retrieve("cleaning", 0, 0.0).expect("retrieve").is_empty());
}

#[test]
fn repeated_add_upserts_by_id() {
    let store = store();
    store.add(&[doc("1", "cleaning"), doc("2", "plumbing")]).expect("first push");
    store.add(&[doc("1", "cleaning"), doc("2", "plumbing")]).expect("second push");
    assert_eq!(store.len(), 2);

    store.add(&[doc("2", "roofing")]).expect("changed text");
    assert_eq!(store.len(), 2);
    assert_eq!(store.document("2").map(|d| d.text), Some("roofing".to_string()));
    let hits = store.ranked_retrieve("roofing", 5, 0.5).expect("retrieve");
    assert_eq!(hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), ["2"]);
}

#[test]
fn open_backend_defaults_to_memory() {
    let settings = Settings::default();
    assert_eq!(settings.vector.backend, BackendKind::Memory);
    let backend = open_backend(&settings, Path::new(".")).expect("backend");
    backend.add(&[doc("1", "painting")]).expect("add");
    assert_eq!(backend.ranked_retrieve("painting", 5, 0.9).expect("retrieve").len(), 1);
}

#[cfg(not(feature = "lance"))]
#[test]
fn lance_backend_requires_feature() {
    let mut settings = Settings::default();
    settings.vector.backend = BackendKind::Lance;
    assert!(open_backend(&settings, Path::new(".")).is_err());
}
