//! Domain types used by the catalog, the similarity backends and the query surface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RecordId = String;
pub type Meta = BTreeMap<String, String>;

/// Normalise a raw service name into the key used for every index and price lookup.
///
/// Trims surrounding whitespace and lowercases. Raw service strings are never
/// compared directly.
pub fn canonical_service_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A single provider entry of the directory.
///
/// - `id`: globally unique, taken from the source data and never regenerated
/// - `services`: declared services in source order, raw form preserved
/// - `prices`: canonical service key -> non-negative amount; a missing key
///   means "price unknown", not "free"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: RecordId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub services: Vec<String>,
    pub prices: BTreeMap<String, f64>,
}

impl ProviderRecord {
    /// Recorded price for a service, looked up by canonical key.
    pub fn price_for(&self, service: &str) -> Option<f64> {
        self.prices.get(&canonical_service_key(service)).copied()
    }
}

/// Text + metadata projection of a record, submitted to the similarity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalDocument {
    pub id: RecordId,
    pub text: String,
    pub metadata: Meta,
}

/// One entry of a ranked retrieval answer.
///
/// `id` matches `RetrievalDocument::id`. `score` is backend-defined but
/// higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: RecordId,
    pub score: f32,
}
