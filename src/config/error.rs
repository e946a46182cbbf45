//! Configuration error types.

use thiserror::Error;

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a setting.
    #[error("failed to parse {key}='{value}': {error}")]
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Setting present but unusable.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
    /// Configuration file could not be read.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Configuration file is not valid JSON for the expected shape.
    #[error("malformed configuration '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
