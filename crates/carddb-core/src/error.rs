use thiserror::Error;

/// Reasons a catalog load is rejected. Any of these aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Malformed catalog: {0}")]
    Malformed(String),

    #[error("Record #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Duplicate id '{id}' at records #{first} and #{second}")]
    DuplicateId { id: String, first: usize, second: usize },

    #[error("Record '{id}' has invalid price {price} for '{service}'")]
    NegativePrice { id: String, service: String, price: f64 },

    #[error("Record '{id}' lists price key '{key}' more than once after normalisation")]
    DuplicatePriceKey { id: String, key: String },

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Similarity backend failed: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
