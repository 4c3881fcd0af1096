//! Per-origin robots.txt cache
//!
//! Each origin gets one [`OnceCell`]. The first caller for an origin runs the
//! fetch; concurrent callers for the same origin wait on the same cell instead
//! of issuing their own request. The map lock is only held to look up or
//! insert a cell, never across the fetch.

use crate::model::Origin;
use crate::robots::{ParsedRobots, PolicyError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Outcome of fetching an origin's robots.txt, with the time it was fetched
#[derive(Debug, Clone)]
pub struct CachedPolicy {
    /// The validated robots.txt, or why it could not be read
    pub outcome: Result<ParsedRobots, PolicyError>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedPolicy {
    /// Creates a new entry stamped with the current time
    pub fn new(outcome: Result<ParsedRobots, PolicyError>) -> Self {
        Self {
            outcome,
            fetched_at: Utc::now(),
        }
    }

    /// Checks an address against the cached policy
    ///
    /// An unreadable policy disallows everything.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.outcome {
            Ok(robots) => robots.is_allowed(url, user_agent),
            Err(_) => false,
        }
    }
}

type Slot = Arc<OnceCell<CachedPolicy>>;

/// Map from origin to its (possibly still loading) policy
#[derive(Debug, Default)]
pub struct PolicyCache {
    slots: Mutex<HashMap<Origin, Slot>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for an origin, creating an empty one if needed
    pub fn slot(&self, origin: &Origin) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(origin.clone()).or_default().clone()
    }

    /// Returns the cached policy for an origin, if it has finished loading
    pub fn get(&self, origin: &Origin) -> Option<CachedPolicy> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(origin).and_then(|slot| slot.get().cloned())
    }

    /// Number of origins with a finished policy
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
