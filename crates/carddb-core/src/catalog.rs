//! Catalog loading.
//!
//! The catalog is parsed once from a JSON array of provider objects. Parsing
//! is all-or-nothing: a single bad record rejects the whole input, so a
//! partially loaded catalog can never be observed.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{LoadError, Result};
use crate::types::{canonical_service_key, ProviderRecord, RecordId};

/// The immutable, ordered set of provider records.
///
/// Record order is source order and defines every tie-break downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    records: Vec<ProviderRecord>,
    by_id: HashMap<RecordId, usize>,
}

impl Catalog {
    /// Validate and take ownership of already-typed records.
    ///
    /// Price keys are canonicalised; duplicate ids and negative prices are rejected.
    pub fn from_records(records: Vec<ProviderRecord>) -> std::result::Result<Self, LoadError> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut normalised = Vec::with_capacity(records.len());
        for (index, mut record) in records.into_iter().enumerate() {
            if let Some(&first) = by_id.get(&record.id) {
                return Err(LoadError::DuplicateId { id: record.id, first, second: index });
            }
            record.prices = canonical_prices(&record.id, record.prices)?;
            for key in record.prices.keys() {
                if !record.services.iter().any(|s| canonical_service_key(s) == *key) {
                    warn!(id = %record.id, service = %key, "price for an undeclared service");
                }
            }
            by_id.insert(record.id.clone(), index);
            normalised.push(record);
        }
        Ok(Self { records: normalised, by_id })
    }

    pub fn records(&self) -> &[ProviderRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Record at a catalog position.
    pub fn at(&self, position: usize) -> Option<&ProviderRecord> { self.records.get(position) }

    pub fn get(&self, id: &str) -> Option<&ProviderRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }
}

fn canonical_prices(id: &str, raw: BTreeMap<String, f64>) -> std::result::Result<BTreeMap<String, f64>, LoadError> {
    let mut prices = BTreeMap::new();
    for (service, price) in raw {
        if !price.is_finite() || price < 0.0 {
            return Err(LoadError::NegativePrice { id: id.to_string(), service, price });
        }
        let key = canonical_service_key(&service);
        if prices.insert(key.clone(), price).is_some() {
            return Err(LoadError::DuplicatePriceKey { id: id.to_string(), key });
        }
    }
    Ok(prices)
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<String>,
    name: Option<String>,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    city: Option<String>,
    services: Option<Vec<String>>,
    prices: Option<BTreeMap<String, f64>>,
}

fn required(value: Option<String>, index: usize, field: &'static str) -> std::result::Result<String, LoadError> {
    value.ok_or(LoadError::MissingField { index, field })
}

impl RawRecord {
    fn into_record(self, index: usize) -> std::result::Result<ProviderRecord, LoadError> {
        Ok(ProviderRecord {
            id: required(self.id, index, "id")?,
            name: required(self.name, index, "name")?,
            company: required(self.company, index, "company")?,
            email: required(self.email, index, "email")?,
            phone: required(self.phone, index, "phone")?,
            city: required(self.city, index, "city")?,
            services: self.services.unwrap_or_default(),
            prices: self.prices.unwrap_or_default(),
        })
    }
}

fn parse(bytes: &[u8]) -> std::result::Result<Catalog, LoadError> {
    let raw: Vec<RawRecord> = serde_json::from_slice(bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;
    let records = raw
        .into_iter()
        .enumerate()
        .map(|(index, r)| r.into_record(index))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Catalog::from_records(records)
}

/// Parse raw catalog bytes (a JSON array of provider objects).
pub fn load_catalog(bytes: &[u8]) -> Result<Catalog> {
    match parse(bytes) {
        Ok(catalog) => {
            info!(records = catalog.len(), "catalog loaded");
            Ok(catalog)
        }
        Err(e) => {
            warn!(error = %e, "catalog rejected");
            Err(e.into())
        }
    }
}

pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let bytes = std::fs::read(path).map_err(LoadError::from)?;
    info!(path = %path.display(), bytes = bytes.len(), "reading catalog");
    load_catalog(&bytes)
}
