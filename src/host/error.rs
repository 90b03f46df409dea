use thiserror::Error;

/// Errors reported by the host platform's query API
#[derive(Debug, Error)]
pub enum HostError {
    /// Patch-set was rejected by the host
    #[error("Patch rejected: {0}")]
    Patch(String),

    /// Data page request failed (network or backend script engine)
    #[error("Data fetch failed: {0}")]
    Fetch(String),

    /// Selection call was rejected
    #[error("Selection failed: {0}")]
    Selection(String),
}

/// Errors produced by the extension itself
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Missing or unusable configuration (no dimension, no measure, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The result page could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(#[source] HostError),

    /// Any other host call failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A result row does not carry the expected cells
    #[error("Malformed page: row {row} has {found} cells, expected at least {expected}")]
    MalformedPage {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Chart backend failure
    #[error("Render error: {0}")]
    Render(String),

    /// JSON encoding of patch payloads or figures
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results using ExtensionError
pub type Result<T> = std::result::Result<T, ExtensionError>;
