//! Robots.txt handling module
//!
//! This module fetches, validates and caches robots.txt per origin and turns
//! it into a [`PolicyDecision`] for each address. Policies are evaluated for
//! the generic agent `*`.
//!
//! Resolution fails closed: if a robots.txt cannot be fetched or read, the
//! address is treated as disallowed and the reason is kept on the decision.

mod cache;
mod parser;
mod resolver;

pub use cache::{CachedPolicy, PolicyCache};
pub use parser::ParsedRobots;
pub use resolver::PolicyResolver;

use crate::harvest::FetchError;
use crate::model::Origin;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// User agent token that policies are evaluated for
pub const POLICY_USER_AGENT: &str = "*";

/// Reasons a robots.txt could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("robots.txt could not be fetched: {0}")]
    Unreachable(#[from] FetchError),

    #[error("robots.txt is not valid UTF-8")]
    Encoding,

    #[error("robots.txt is malformed at line {line}: '{text}'")]
    Malformed { line: usize, text: String },

    #[error("no robots.txt location for address: {0}")]
    InvalidAddress(String),
}

/// Whether an address may be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// Origin the policy was resolved for; `None` only for host-less addresses
    pub origin: Option<Origin>,

    pub allowed: bool,

    /// When the origin's robots.txt was fetched
    pub resolved_at: DateTime<Utc>,

    /// Set when the decision is a fail-closed fallback
    pub error: Option<PolicyError>,
}

impl PolicyDecision {
    /// A fail-closed decision
    pub fn unresolvable(origin: Option<Origin>, error: PolicyError) -> Self {
        Self {
            origin,
            allowed: false,
            resolved_at: Utc::now(),
            error: Some(error),
        }
    }

    /// Returns true if the policy could not be read
    pub fn is_unresolvable(&self) -> bool {
        self.error.is_some()
    }
}
