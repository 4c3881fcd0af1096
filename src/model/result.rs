//! Per-target results and the ordered batch they are collected into

use crate::model::Target;
use std::collections::HashMap;
use std::fmt;

/// Outcome of processing one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    /// Page was fetched and the selector was applied (content may be empty)
    Extracted,

    /// robots.txt was read and disallows the address
    SkippedByPolicy,

    /// robots.txt could not be fetched or read; treated as a disallow
    PolicyUnresolvable,

    /// Page fetch failed (network error or non-2xx status)
    FetchFailed,

    /// Run was cancelled before this target finished
    Cancelled,
}

impl ResultStatus {
    /// Returns true if content was extracted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns the status as a lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extracted => "extracted",
            Self::SkippedByPolicy => "skipped_by_policy",
            Self::PolicyUnresolvable => "policy_unresolvable",
            Self::FetchFailed => "fetch_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all statuses in reporting order
    pub fn all() -> [Self; 5] {
        [
            Self::Extracted,
            Self::SkippedByPolicy,
            Self::PolicyUnresolvable,
            Self::FetchFailed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of processing a single target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    pub target: Target,

    /// Extracted text; always empty unless the status is `Extracted`
    pub content: String,

    pub status: ResultStatus,

    /// Diagnostic cause for failure statuses
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn extracted(target: Target, content: String) -> Self {
        Self {
            target,
            content,
            status: ResultStatus::Extracted,
            error: None,
        }
    }

    /// Creates a result with no content
    pub fn failed(target: Target, status: ResultStatus, error: Option<String>) -> Self {
        Self {
            target,
            content: String::new(),
            status,
            error,
        }
    }
}

/// Results of one run, one per input target, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultBatch {
    results: Vec<ScrapeResult>,
}

impl ResultBatch {
    pub fn new(results: Vec<ScrapeResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScrapeResult> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScrapeResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[ScrapeResult] {
        &self.results
    }

    /// Counts results per status
    pub fn count_by_status(&self) -> HashMap<ResultStatus, usize> {
        let mut counts = HashMap::new();
        for result in &self.results {
            *counts.entry(result.status).or_insert(0) += 1;
        }
        counts
    }

    pub fn count(&self, status: ResultStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

impl IntoIterator for ResultBatch {
    type Item = ScrapeResult;
    type IntoIter = std::vec::IntoIter<ScrapeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultBatch {
    type Item = &'a ScrapeResult;
    type IntoIter = std::slice::Iter<'a, ScrapeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
