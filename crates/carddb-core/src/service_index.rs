use std::collections::BTreeMap;
use tracing::info;

use crate::catalog::Catalog;
use crate::types::canonical_service_key;

/// Canonical service key -> catalog positions of the records offering it.
///
/// Positions are kept in catalog order. A record that declares the same
/// service twice (after canonicalisation) appears twice; entries are never
/// deduplicated. Built once from a loaded catalog and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceIndex {
    by_key: BTreeMap<String, Vec<usize>>,
}

impl ServiceIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (position, record) in catalog.records().iter().enumerate() {
            for service in &record.services {
                let key = canonical_service_key(service);
                // blank declarations are unreachable by lookup
                if key.is_empty() { continue; }
                by_key.entry(key).or_default().push(position);
            }
        }
        info!(services = by_key.len(), "service index built");
        Self { by_key }
    }

    /// Positions for a service; the key is canonicalised first. Unknown keys yield an empty slice.
    pub fn lookup(&self, service: &str) -> &[usize] {
        self.by_key.get(&canonical_service_key(service)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known canonical keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.by_key.len() }

    pub fn is_empty(&self) -> bool { self.by_key.is_empty() }
}
