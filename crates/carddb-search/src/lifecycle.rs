//! Startup sequence: load -> index -> project & push -> ready.
//!
//! `Lifecycle` runs the sequence once. It takes `&mut self`, so it cannot be
//! re-entered, and there is no path back from `Ready` or `Failed`.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use carddb_core::catalog::{load_catalog, load_catalog_file, Catalog};
use carddb_core::error::{Error, Result};
use carddb_core::traits::SimilarityBackend;

use crate::engine::{SearchEngine, SearchLimits};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug)]
pub struct Lifecycle { state: EngineState }

impl Default for Lifecycle {
    fn default() -> Self { Self { state: EngineState::Uninitialized } }
}

impl Lifecycle {
    pub fn new() -> Self { Self::default() }

    pub fn state(&self) -> EngineState { self.state }

    /// Start from raw catalog bytes.
    pub fn start(&mut self, raw: &[u8], backend: Arc<dyn SimilarityBackend>, limits: SearchLimits) -> Result<SearchEngine> {
        self.run(|| load_catalog(raw), backend, limits)
    }

    pub fn start_from_file(&mut self, path: &Path, backend: Arc<dyn SimilarityBackend>, limits: SearchLimits) -> Result<SearchEngine> {
        self.run(|| load_catalog_file(path), backend, limits)
    }

    fn run<F>(&mut self, load: F, backend: Arc<dyn SimilarityBackend>, limits: SearchLimits) -> Result<SearchEngine>
    where
        F: FnOnce() -> Result<Catalog>,
    {
        if self.state != EngineState::Uninitialized {
            return Err(Error::InvalidState(format!("cannot start engine from {:?}", self.state)));
        }
        self.transition(EngineState::Loading);
        let result = load().and_then(|catalog| {
            let engine = SearchEngine::new(catalog, backend, limits);
            engine.publish()?;
            Ok(engine)
        });
        match result {
            Ok(engine) => {
                self.transition(EngineState::Ready);
                Ok(engine)
            }
            Err(e) => {
                warn!(error = %e, "engine startup failed");
                self.transition(EngineState::Failed);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: EngineState) {
        info!(from = ?self.state, to = ?next, "engine state");
        self.state = next;
    }
}
