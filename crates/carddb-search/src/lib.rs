//! carddb-search
//!
//! The search engine over a loaded provider catalog, its startup lifecycle,
//! and the tool registry that exposes the engine's operations by name.

pub mod engine;
pub mod lifecycle;
pub mod tools;

pub use engine::{SearchEngine, SearchLimits};
pub use lifecycle::{EngineState, Lifecycle};
pub use tools::{SearchResponse, ToolRegistry, ToolSpec};
