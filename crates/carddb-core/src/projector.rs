//! Deterministic projection of provider records into retrieval documents.
//!
//! The same record always renders to byte-identical text and metadata, so
//! projections can be compared across runs.

use crate::catalog::Catalog;
use crate::types::{Meta, ProviderRecord, RetrievalDocument};

pub fn project(record: &ProviderRecord) -> RetrievalDocument {
    let services = record.services.join(", ");
    let prices = record
        .prices
        .iter()
        .map(|(service, amount)| format!("{service}:€{amount}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let text = collapse_whitespace(&format!(
        "Provider: {}\nCompany: {}\nCity: {}\nServices: {}\nPrices: {}\nContact: {} {}\n",
        record.name, record.company, record.city, services, prices, record.email, record.phone,
    ));

    let mut metadata = Meta::new();
    metadata.insert("id".to_string(), record.id.clone());
    metadata.insert("name".to_string(), record.name.clone());
    metadata.insert("company".to_string(), record.company.clone());
    metadata.insert("city".to_string(), record.city.clone());
    metadata.insert("services".to_string(), record.services.join(","));

    RetrievalDocument { id: record.id.clone(), text, metadata }
}

/// One document per record, in catalog order.
pub fn project_catalog(catalog: &Catalog) -> Vec<RetrievalDocument> {
    catalog.records().iter().map(project).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
