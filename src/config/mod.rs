//! Configuration module for Mapsift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files describing a crawl: the query list, filtering rules, pacing delays,
//! traversal caps, and output paths.
//!
//! # Example
//!
//! ```no_run
//! use mapsift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Queries configured: {}", config.search.queries.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, DelayConfig, FilterConfig, OutputConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
