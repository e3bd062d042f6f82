//! carddb-core
//!
//! Domain types, the catalog loader, the derived service index and the
//! retrieval-document projector shared by the search and vector crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod projector;
pub mod service_index;
pub mod traits;
pub mod types;
