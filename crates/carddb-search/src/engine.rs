use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use carddb_core::catalog::Catalog;
use carddb_core::config::Settings;
use carddb_core::error::{Error, Result};
use carddb_core::projector::project_catalog;
use carddb_core::service_index::ServiceIndex;
use carddb_core::traits::SimilarityBackend;
use carddb_core::types::{canonical_service_key, ProviderRecord};

/// Result caps and semantic defaults applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub max_results: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub min_score: f32,
}

impl Default for SearchLimits {
    fn default() -> Self { Self { max_results: 50, default_top_k: 10, max_top_k: 50, min_score: 0.60 } }
}

impl SearchLimits {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_results: settings.search.max_results,
            default_top_k: settings.semantic.default_top_k,
            max_top_k: settings.semantic.max_top_k,
            min_score: settings.semantic.min_score,
        }
    }

    /// Absent, zero or negative requests fall back to `default_top_k`; larger ones are capped at `max_top_k`.
    pub fn clamp_top_k(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(k) if k >= 1 => usize::try_from(k).unwrap_or(usize::MAX).min(self.max_top_k),
            _ => self.default_top_k,
        }
    }
}

/// Read-only query engine over an immutable catalog snapshot.
///
/// Owns the catalog and its service index; the similarity backend is shared
/// and only reached through `SimilarityBackend`.
pub struct SearchEngine {
    catalog: Catalog,
    services: ServiceIndex,
    backend: Arc<dyn SimilarityBackend>,
    limits: SearchLimits,
}

impl SearchEngine {
    pub fn new(catalog: Catalog, backend: Arc<dyn SimilarityBackend>, limits: SearchLimits) -> Self {
        let services = ServiceIndex::build(&catalog);
        Self { catalog, services, backend, limits }
    }

    /// Project every record and push the documents to the backend once.
    pub fn publish(&self) -> Result<usize> {
        let documents = project_catalog(&self.catalog);
        self.backend.add(&documents).map_err(Error::Backend)?;
        tracing::info!(documents = documents.len(), "retrieval documents pushed");
        Ok(documents.len())
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn service_index(&self) -> &ServiceIndex { &self.services }

    pub fn limits(&self) -> &SearchLimits { &self.limits }

    /// Case-insensitive substring match on name or company, catalog order, capped.
    pub fn search_by_name_contains(&self, query: &str) -> Vec<&ProviderRecord> {
        if query.trim().is_empty() { return Vec::new(); }
        let needle = query.to_lowercase();
        let found: Vec<&ProviderRecord> = self
            .catalog
            .records()
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle) || r.company.to_lowercase().contains(&needle))
            .take(self.limits.max_results)
            .collect();
        debug!(query, results = found.len(), "search by name");
        found
    }

    /// Providers declaring a service, in catalog order. Unknown services yield nothing.
    pub fn search_by_service(&self, service: &str) -> Vec<&ProviderRecord> {
        if service.trim().is_empty() { return Vec::new(); }
        let found: Vec<&ProviderRecord> =
            self.services.lookup(service).iter().filter_map(|&p| self.catalog.at(p)).collect();
        debug!(service, results = found.len(), "search by service");
        found
    }

    /// Providers of a service ordered by their price for it, unpriced ones last, capped.
    pub fn search_by_service_cheapest_first(&self, service: &str) -> Vec<&ProviderRecord> {
        let key = canonical_service_key(service);
        let mut found = self.search_by_service(service);
        found.sort_by(|a, b| match (a.prices.get(&key), b.prices.get(&key)) {
            (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        found.truncate(self.limits.max_results);
        found
    }

    /// Priced providers of a service at or under `max_price`, cheapest first.
    ///
    /// Providers without a recorded price never match. Equal prices keep
    /// catalog order. A non-positive or NaN bound yields nothing.
    pub fn search_by_service_and_price(&self, service: &str, max_price: f64) -> Vec<&ProviderRecord> {
        if max_price.is_nan() || max_price <= 0.0 { return Vec::new(); }
        let key = canonical_service_key(service);
        let mut priced: Vec<(f64, &ProviderRecord)> = self
            .search_by_service(service)
            .into_iter()
            .filter_map(|r| r.prices.get(&key).map(|&p| (p, r)))
            .filter(|(p, _)| *p <= max_price)
            .collect();
        priced.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let found: Vec<&ProviderRecord> = priced.into_iter().map(|(_, r)| r).take(self.limits.max_results).collect();
        debug!(service, max_price, results = found.len(), "search by service and price");
        found
    }

    /// Natural-language lookup through the similarity backend.
    ///
    /// Hits are mapped back to catalog records by id, keeping the backend's
    /// order. Ids unknown to the catalog are dropped. A `top_k` of 0 falls
    /// back to `default_top_k`; larger values are capped at `max_top_k`.
    /// Backend failures are returned, never retried.
    pub fn semantic_search(&self, query: &str, top_k: usize, min_score: f32) -> Result<Vec<&ProviderRecord>> {
        if query.trim().is_empty() { return Ok(Vec::new()); }
        let top_k = if top_k == 0 { self.limits.default_top_k } else { top_k.min(self.limits.max_top_k) };
        let hits = self.backend.ranked_retrieve(query, top_k, min_score).map_err(Error::Backend)?;

        let mut found = Vec::with_capacity(hits.len());
        for hit in &hits {
            match self.catalog.get(&hit.id) {
                Some(record) => found.push(record),
                None => debug!(id = %hit.id, "dropping stale id"),
            }
        }
        debug!(query, top_k, hits = hits.len(), results = found.len(), "semantic search");
        Ok(found)
    }
}
