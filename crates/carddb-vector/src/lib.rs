//! carddb-vector
//!
//! Similarity backends behind `carddb_core::traits::SimilarityBackend`:
//! an in-memory cosine store (always available) and a LanceDB store
//! (`lance` feature).

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use carddb_core::config::{BackendKind, Settings};
use carddb_core::traits::SimilarityBackend;
use carddb_embed::default_embedder;

pub mod memory;
#[cfg(feature = "lance")]
pub mod lance;

pub use memory::MemoryVectorStore;
#[cfg(feature = "lance")]
pub use lance::LanceVectorStore;

/// Build the backend selected by `vector.backend`, relative paths resolved against `base_dir`.
pub fn open_backend(settings: &Settings, base_dir: &Path) -> Result<Arc<dyn SimilarityBackend>> {
    let embedder = default_embedder(settings.embedding.dim)?;
    match settings.vector.backend {
        BackendKind::Memory => {
            Ok(Arc::new(MemoryVectorStore::new(embedder).with_progress(settings.vector.show_progress)))
        }
        #[cfg(feature = "lance")]
        BackendKind::Lance => {
            let dir = settings.lance_dir(base_dir);
            Ok(Arc::new(LanceVectorStore::open(&dir, &settings.vector.table, embedder)?))
        }
        #[cfg(not(feature = "lance"))]
        BackendKind::Lance => {
            let _ = base_dir;
            anyhow::bail!("vector.backend = \"lance\" requires building carddb-vector with the `lance` feature")
        }
    }
}
