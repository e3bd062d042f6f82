//! Tool registry
//!
//! The table of named search operations an orchestrator may call. Each entry
//! carries a description, a JSON Schema for its arguments and a handler that
//! decodes the arguments and delegates to `SearchEngine`. The table is built
//! once and never changes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use carddb_core::error::{Error, Result};
use carddb_core::types::ProviderRecord;

use crate::engine::SearchEngine;

pub const FIND_BY_NAME: &str = "find_by_name";
pub const FIND_BY_SERVICE: &str = "find_by_service";
pub const FIND_BY_SERVICE_AND_PRICE: &str = "find_by_service_and_price";
pub const SEMANTIC_FIND: &str = "semantic_find";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindByNameArgs {
    /// Partial name or company
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindByServiceArgs {
    /// Type of service requested, like 'cleaning' or 'construction'
    pub service: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindByServiceAndPriceArgs {
    /// Service type, e.g. 'plumbing', 'painting'
    pub service: String,
    /// Maximum price threshold for the given service
    pub max_price: f64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemanticFindArgs {
    /// Natural language query describing the service need
    pub query: String,
    /// Maximum number of results to return (default 10, max 50)
    #[serde(default)]
    pub top_k: Option<i64>,
}

/// What every tool returns: the matches plus an echo of the inputs used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: Option<String>,
    pub service: Option<String>,
    pub max_price: Option<f64>,
    pub total: usize,
    pub matches: Vec<ProviderRecord>,
}

impl SearchResponse {
    fn new(query: Option<String>, service: Option<String>, max_price: Option<f64>, matches: Vec<&ProviderRecord>) -> Self {
        let matches: Vec<ProviderRecord> = matches.into_iter().cloned().collect();
        Self { query, service, max_price, total: matches.len(), matches }
    }
}

type Handler = fn(&SearchEngine, Value) -> Result<SearchResponse>;

pub struct ToolSpec {
    pub name: &'static str,
    /// Earlier names still accepted on lookup.
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub parameters: Value,
    handler: Handler,
}

impl ToolSpec {
    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

pub struct ToolRegistry {
    engine: Arc<SearchEngine>,
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new(engine: Arc<SearchEngine>) -> Result<Self> {
        let tools = vec![
            ToolSpec {
                name: FIND_BY_NAME,
                aliases: &["find_cards_by_name"],
                description: "Retrieve service providers by matching a fragment of their name or company. \
                    Useful when the user remembers only part of it (e.g. \"Marta\", \"CleanCo\", \"FixIt\"). \
                    Returns each provider with contact info and per-service prices.",
                parameters: schema::<FindByNameArgs>()?,
                handler: find_by_name,
            },
            ToolSpec {
                name: FIND_BY_SERVICE,
                aliases: &["find_cards_by_service"],
                description: "Retrieve local service providers by the type of service offered \
                    (e.g. \"plumbing\", \"electrical repair\", \"home cleaning\", \"roofing\"). \
                    Results are sorted by lowest price for that service and include contact and pricing data.",
                parameters: schema::<FindByServiceArgs>()?,
                handler: find_by_service,
            },
            ToolSpec {
                name: FIND_BY_SERVICE_AND_PRICE,
                aliases: &["find_cards_by_service_and_price"],
                description: "Find providers of a service whose price for it is at most a maximum. \
                    Example: cleaning services under 80 euros, or electricians below 150. \
                    Cheapest first; providers without a known price are left out.",
                parameters: schema::<FindByServiceAndPriceArgs>()?,
                handler: find_by_service_and_price,
            },
            ToolSpec {
                name: SEMANTIC_FIND,
                aliases: &["semantic_find_cards"],
                description: "Meaning-based search for the best matching service providers. \
                    The query can be natural language such as \"I need someone to fix a leaking kitchen pipe\" \
                    or \"looking for affordable home cleaning in Berlin\".",
                parameters: schema::<SemanticFindArgs>()?,
                handler: semantic_find,
            },
        ];
        Ok(Self { engine, tools })
    }

    pub fn tools(&self) -> &[ToolSpec] { &self.tools }

    /// Look a tool up by its name or one of its aliases.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.answers_to(name))
    }

    pub fn call(&self, name: &str, args: Value) -> Result<SearchResponse> {
        let tool = self.get(name).ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        debug!(tool = tool.name, %args, "tool call");
        (tool.handler)(self.engine.as_ref(), args)
    }

    pub fn engine(&self) -> &SearchEngine { &self.engine }
}

fn schema<T: JsonSchema>() -> Result<Value> {
    serde_json::to_value(schemars::schema_for!(T)).map_err(|e| Error::InvalidConfig(format!("tool schema: {e}")))
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() { Value::Object(serde_json::Map::new()) } else { args };
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments { tool: tool.to_string(), message: e.to_string() })
}

fn find_by_name(engine: &SearchEngine, args: Value) -> Result<SearchResponse> {
    let args: FindByNameArgs = parse_args(FIND_BY_NAME, args)?;
    let matches = engine.search_by_name_contains(&args.query);
    Ok(SearchResponse::new(Some(args.query), None, None, matches))
}

fn find_by_service(engine: &SearchEngine, args: Value) -> Result<SearchResponse> {
    let args: FindByServiceArgs = parse_args(FIND_BY_SERVICE, args)?;
    let matches = engine.search_by_service_cheapest_first(&args.service);
    Ok(SearchResponse::new(None, Some(args.service), None, matches))
}

fn find_by_service_and_price(engine: &SearchEngine, args: Value) -> Result<SearchResponse> {
    let args: FindByServiceAndPriceArgs = parse_args(FIND_BY_SERVICE_AND_PRICE, args)?;
    let matches = engine.search_by_service_and_price(&args.service, args.max_price);
    Ok(SearchResponse::new(None, Some(args.service), Some(args.max_price), matches))
}

fn semantic_find(engine: &SearchEngine, args: Value) -> Result<SearchResponse> {
    let args: SemanticFindArgs = parse_args(SEMANTIC_FIND, args)?;
    let limits = engine.limits();
    let top_k = limits.clamp_top_k(args.top_k);
    let matches = engine.semantic_search(&args.query, top_k, limits.min_score)?;
    Ok(SearchResponse::new(Some(args.query), None, None, matches))
}
