use crate::harvest::{Fetch, FetchError};
use crate::model::Origin;
use crate::robots::cache::{CachedPolicy, PolicyCache};
use crate::robots::{ParsedRobots, PolicyDecision, PolicyError, POLICY_USER_AGENT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Decides whether addresses may be fetched according to their robots.txt
///
/// Each origin's robots.txt is fetched at most once per resolver, even under
/// concurrent use. Any failure to fetch or read it is folded into a
/// fail-closed decision (`allowed = false`) carrying the [`PolicyError`].
pub struct PolicyResolver {
    fetcher: Arc<dyn Fetch>,
    cache: PolicyCache,
    fetches: AtomicUsize,
}

impl PolicyResolver {
    /// Creates a resolver with an empty cache
    ///
    /// `fetcher` should be single-attempt; it is used only for robots.txt.
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher,
            cache: PolicyCache::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Resolves the policy decision for an address
    ///
    /// Never fails: network errors, any status other than 200 (404 and 204
    /// included) and unreadable bodies all produce `allowed = false`.
    pub async fn resolve(&self, address: &Url) -> PolicyDecision {
        let Some(origin) = Origin::from_url(address) else {
            tracing::warn!("Cannot resolve robots.txt for {}: address has no host", address);
            return PolicyDecision::unresolvable(
                None,
                PolicyError::InvalidAddress(address.to_string()),
            );
        };

        let slot = self.cache.slot(&origin);
        let cached = slot.get_or_init(|| self.load(&origin)).await;

        PolicyDecision {
            allowed: cached.is_allowed(address.as_str(), POLICY_USER_AGENT),
            resolved_at: cached.fetched_at,
            error: cached.outcome.as_ref().err().cloned(),
            origin: Some(origin),
        }
    }

    /// Number of robots.txt fetches this resolver has started
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of origins whose policy has been resolved
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    async fn load(&self, origin: &Origin) -> CachedPolicy {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let outcome = match origin.robots_url() {
            Some(robots_url) => {
                tracing::debug!("Fetching robots.txt: {}", robots_url);
                match self.fetcher.fetch(&robots_url).await {
                    // 204, 206 and friends carry no usable policy
                    Ok(page) if page.status != 200 => {
                        Err(PolicyError::Unreachable(FetchError::HttpStatus(page.status)))
                    }
                    Ok(page) => ParsedRobots::parse(&page.body),
                    Err(e) => Err(PolicyError::Unreachable(e)),
                }
            }
            None => Err(PolicyError::InvalidAddress(origin.to_string())),
        };

        match &outcome {
            Ok(robots) => {
                if let Some(delay) = robots.crawl_delay() {
                    tracing::debug!("robots.txt for {} declares crawl-delay {}s", origin, delay);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Couldn't retrieve or parse robots.txt for {}; treating as disallowed: {}",
                    origin,
                    e
                );
            }
        }

        CachedPolicy::new(outcome)
    }
}
