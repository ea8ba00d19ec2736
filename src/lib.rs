//! Mapsift: a resumable venue crawler for map-style web applications
//!
//! This crate implements a crawl-and-extract engine that drives a browser
//! session through search, result-list, detail, and sub-list views of a
//! map application, producing a deduplicated, filtered, checkpointed
//! dataset of venue records and their sub-items.

pub mod browser;
pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod filter;
pub mod output;
pub mod record;
pub mod site;

use thiserror::Error;

/// Main error type for Mapsift operations
#[derive(Debug, Error)]
pub enum MapsiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser session error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Mapsift operations
pub type Result<T> = std::result::Result<T, MapsiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{BrowserError, BrowserSession};
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, RunSummary};
pub use dedup::{identity_key, AcceptedSet};
pub use record::{Record, RecordFields, ResultEntry, SubItem};
