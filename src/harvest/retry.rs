//! Retry decorator for fetchers
//!
//! The retriever itself makes exactly one attempt. Content fetches in the
//! pipeline go through this wrapper, which repeats transient failures
//! (network errors and 5xx) with a fixed delay between attempts.

use crate::harvest::fetcher::{Fetch, FetchError, FetchedPage};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Wraps a fetcher and retries transient failures
pub struct RetryingFetcher {
    inner: Arc<dyn Fetch>,
    max_attempts: u32,
    delay: Duration,
}

impl RetryingFetcher {
    /// Creates a retrying wrapper
    ///
    /// `max_attempts` counts the first attempt; values below 1 are treated as 1.
    pub fn new(inner: Arc<dyn Fetch>, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[async_trait]
impl Fetch for RetryingFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Fetch attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        url,
                        e,
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
