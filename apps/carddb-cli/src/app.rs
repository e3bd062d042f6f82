//! Startup wiring: configuration to a ready tool registry.

use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::{error, info};

use carddb_core::catalog::load_catalog_file;
use carddb_core::config::Config;
use carddb_core::projector::project_catalog;
use carddb_core::types::RetrievalDocument;
use carddb_search::{Lifecycle, SearchLimits, ToolRegistry};
use carddb_vector::open_backend;

/// Load the catalog named by `config`, push it to the configured backend and
/// return the registry serving the four tools. Failures are logged before returning.
pub fn bootstrap(config: &Config) -> anyhow::Result<ToolRegistry> {
    start_registry(config).inspect_err(|e| error!(error = %format!("{e:#}"), "startup failed"))
}

fn start_registry(config: &Config) -> anyhow::Result<ToolRegistry> {
    let settings = config.settings()?;
    let catalog_path = settings.catalog_path(config.base_dir());
    info!(catalog = %catalog_path.display(), backend = ?settings.vector.backend, "starting engine");

    let backend = open_backend(&settings, config.base_dir())?;
    let mut lifecycle = Lifecycle::new();
    let engine = lifecycle
        .start_from_file(&catalog_path, backend, SearchLimits::from_settings(&settings))
        .with_context(|| format!("failed to start from {}", catalog_path.display()))?;
    Ok(ToolRegistry::new(Arc::new(engine))?)
}

/// Retrieval documents for the configured catalog, without touching a backend.
pub fn documents(config: &Config) -> anyhow::Result<Vec<RetrievalDocument>> {
    let settings = config.settings()?;
    let catalog = load_catalog_file(&settings.catalog_path(config.base_dir()))?;
    Ok(project_catalog(&catalog))
}

/// Name, description and argument schema for every tool.
pub fn describe_tools(registry: &ToolRegistry) -> Value {
    let tools: Vec<Value> = registry
        .tools()
        .iter()
        .map(|t| json!({ "name": t.name, "description": t.description, "parameters": t.parameters }))
        .collect();
    Value::Array(tools)
}

/// Parse one interactive line of the form `<tool> [json-args]`.
pub fn parse_call_line(line: &str) -> anyhow::Result<(&str, Value)> {
    let line = line.trim();
    let (tool, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    anyhow::ensure!(!tool.is_empty(), "expected `<tool> [json-args]`");
    let args = if rest.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(rest.trim()).context("arguments must be a JSON object")?
    };
    Ok((tool, args))
}

/// `exit` or `quit`, in any case, ends the interactive loop.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}
