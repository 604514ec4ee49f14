//! Error types for the league analytics engine
//!
//! Analyzers themselves never fail: empty input yields an empty table and
//! degenerate ratios yield `None`. Errors only surface while loading or
//! validating configuration and datasets.

use thiserror::Error;

/// Result type for league analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while preparing analytics input
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}
