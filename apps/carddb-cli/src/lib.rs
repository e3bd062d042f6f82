//! carddb-cli
//!
//! Wiring for the `carddb` binary: building the registry from configuration
//! and the single-reader output stream used by the interactive loop.

pub mod app;
pub mod output;
