//! Configuration module for Sumi-Glean
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. A configuration names the targets of a run and how to reach them.
//!
//! # Example
//!
//! ```no_run
//! use sumi_glean::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sites.toml")).unwrap();
//! let targets = config.build_targets().unwrap();
//! println!("Will process {} targets", targets.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, OutputConfig, TargetEntry, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
