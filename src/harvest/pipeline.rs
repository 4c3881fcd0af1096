//! Pipeline - per-target orchestration
//!
//! For every target the pipeline runs three steps:
//! 1. Policy check against the origin's robots.txt
//! 2. Fetch of the page (with the configured retry decorator)
//! 3. Extraction of the selected elements' text
//!
//! A failure in any step ends that target with a status value; it never
//! aborts the batch. Targets run concurrently up to a limit, and results come
//! back in input order.

use crate::config::Config;
use crate::harvest::extractor::extract_page;
use crate::harvest::fetcher::{Fetch, Retriever};
use crate::harvest::retry::RetryingFetcher;
use crate::model::{ResultBatch, ResultStatus, ScrapeResult, Target};
use crate::robots::PolicyResolver;
use crate::ConfigError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Main pipeline structure
pub struct Pipeline {
    content_fetcher: Arc<dyn Fetch>,
    policy_fetcher: Arc<dyn Fetch>,
    concurrency: usize,
}

impl Pipeline {
    /// Creates a pipeline from explicit fetchers
    ///
    /// # Arguments
    ///
    /// * `content_fetcher` - Used for target pages (may retry)
    /// * `policy_fetcher` - Used for robots.txt (single attempt)
    /// * `concurrency` - Maximum targets in flight; 0 is treated as 1
    pub fn new(
        content_fetcher: Arc<dyn Fetch>,
        policy_fetcher: Arc<dyn Fetch>,
        concurrency: usize,
    ) -> Self {
        Self {
            content_fetcher,
            policy_fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Creates a pipeline backed by a real HTTP client
    ///
    /// Content fetches are wrapped in a [`RetryingFetcher`] when more than
    /// one attempt is configured.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let retriever: Arc<dyn Fetch> =
            Arc::new(Retriever::new(&config.fetch, &config.user_agent)?);

        let content_fetcher: Arc<dyn Fetch> = if config.fetch.max_attempts > 1 {
            Arc::new(RetryingFetcher::new(
                retriever.clone(),
                config.fetch.max_attempts,
                Duration::from_millis(config.fetch.retry_delay_ms),
            ))
        } else {
            retriever.clone()
        };

        Ok(Self::new(content_fetcher, retriever, config.fetch.concurrency))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes every target and returns one result per target, in order
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTargets` for an empty target list, before any
    /// network activity.
    pub async fn run(&self, targets: &[Target]) -> Result<ResultBatch, ConfigError> {
        self.run_with_cancel(targets, CancellationToken::new()).await
    }

    /// Like [`Pipeline::run`], but stops early when `cancel` fires
    ///
    /// Targets that are in flight or not yet started when the token is
    /// cancelled get the `Cancelled` status; the batch still has one result
    /// per target.
    pub async fn run_with_cancel(
        &self,
        targets: &[Target],
        cancel: CancellationToken,
    ) -> Result<ResultBatch, ConfigError> {
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        tracing::info!(
            "Starting run: {} targets, concurrency {}",
            targets.len(),
            self.concurrency
        );
        let start_time = Instant::now();

        // One resolver per run: robots.txt decisions are never reused across runs
        let resolver = PolicyResolver::new(self.policy_fetcher.clone());
        let resolver = &resolver;
        let cancel = &cancel;

        let results: Vec<ScrapeResult> = stream::iter(targets)
            .map(move |target| self.process_or_cancel(resolver, target, cancel))
            .buffered(self.concurrency)
            .collect()
            .await;

        let batch = ResultBatch::new(results);

        tracing::info!(
            "Run finished in {:?}: {} extracted, {} skipped by policy, {} policy unresolvable, {} fetch failed, {} cancelled ({} robots.txt fetches)",
            start_time.elapsed(),
            batch.count(ResultStatus::Extracted),
            batch.count(ResultStatus::SkippedByPolicy),
            batch.count(ResultStatus::PolicyUnresolvable),
            batch.count(ResultStatus::FetchFailed),
            batch.count(ResultStatus::Cancelled),
            resolver.fetch_count()
        );

        Ok(batch)
    }

    async fn process_or_cancel(
        &self,
        resolver: &PolicyResolver,
        target: &Target,
        cancel: &CancellationToken,
    ) -> ScrapeResult {
        if cancel.is_cancelled() {
            return cancelled(target);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Abandoning {}: run cancelled", target.address());
                cancelled(target)
            }
            result = self.process(resolver, target) => result,
        }
    }

    /// Runs policy check, fetch and extraction for one target
    pub async fn process(&self, resolver: &PolicyResolver, target: &Target) -> ScrapeResult {
        let address = target.address();
        tracing::info!(
            "Checking permission and parsing content from {} ({})",
            address,
            target.selector()
        );

        // Step 1: policy
        let decision = resolver.resolve(address).await;
        if !decision.allowed {
            return match decision.error {
                Some(e) => {
                    tracing::warn!("Skipping {}: robots.txt unresolvable: {}", address, e);
                    ScrapeResult::failed(
                        target.clone(),
                        ResultStatus::PolicyUnresolvable,
                        Some(e.to_string()),
                    )
                }
                None => {
                    tracing::info!("Scraping disallowed by robots.txt for {}; skipping", address);
                    ScrapeResult::failed(target.clone(), ResultStatus::SkippedByPolicy, None)
                }
            };
        }

        // Step 2: fetch
        let page = match self.content_fetcher.fetch(address).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", address, e);
                return ScrapeResult::failed(
                    target.clone(),
                    ResultStatus::FetchFailed,
                    Some(e.to_string()),
                );
            }
        };

        // Step 3: extract
        let content = extract_page(&page, target.selector());
        tracing::debug!(
            "Extracted {} chars from {} ({} bytes fetched)",
            content.chars().count(),
            address,
            page.body.len()
        );

        ScrapeResult::extracted(target.clone(), content)
    }
}

fn cancelled(target: &Target) -> ScrapeResult {
    ScrapeResult::failed(
        target.clone(),
        ResultStatus::Cancelled,
        Some("run cancelled".to_string()),
    )
}
