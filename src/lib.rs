//! Sumi-Glean: a polite page content gleaner
//!
//! This crate checks each target page against its site's robots.txt, fetches
//! the pages that may be fetched, extracts text from the elements matching a
//! tag/class selector, and persists the results to CSV and SQLite.

pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod robots;

use thiserror::Error;

/// Main error type for Sumi-Glean operations
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// These are the only errors that abort a run, and they are always raised
/// before any network activity begins.
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

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("No targets given")]
    NoTargets,
}

/// Result type alias for Sumi-Glean operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Fetch, FetchError, FetchedPage, Pipeline, Retriever};
pub use model::{Origin, ResultBatch, ResultStatus, ScrapeResult, Selector, Target};
pub use robots::{PolicyDecision, PolicyError, PolicyResolver};
