//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the gleaner:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - Single-attempt GET requests
//! - Error classification into network failures and HTTP status failures
//! - Keeping the status and `Content-Type` alongside the raw body
//!
//! Retries are not done here; see [`crate::harvest::RetryingFetcher`].

use crate::config::{FetchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

/// Errors from a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS failure, connection refused, timeout, TLS failure, truncated body
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("HTTP {0}")]
    HttpStatus(u16),
}

impl FetchError {
    /// Returns true for failures that may succeed on a later attempt
    ///
    /// Network failures and 5xx responses are transient. Every other status,
    /// including 429, is returned to the caller as is.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus(code) => (500..600).contains(code),
        }
    }
}

/// A successful (2xx) response
///
/// The body is kept as raw bytes; decoding is left to the consumer, which can
/// combine the header charset with what the document itself declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// A plain `200 OK` response without a `Content-Type`
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, None, body)
    }

    /// Returns the `charset` parameter of the `Content-Type` header, if any
    pub fn charset(&self) -> Option<&str> {
        let content_type = self.content_type.as_deref()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                (!value.is_empty()).then_some(value)
            } else {
                None
            }
        })
    }
}

/// Something that can retrieve an address
///
/// The pipeline and the robots resolver talk to the network only through this
/// trait, so either can be driven by a decorator or a test double.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs one retrieval of `url`
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `fetch` - Timeout settings
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_glean::config::{FetchConfig, UserAgentConfig};
/// use sumi_glean::harvest::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "SumiGlean".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&FetchConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    fetch: &FetchConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Single-attempt HTTP retriever
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | `Ok(FetchedPage)` |
/// | Any other status | `FetchError::HttpStatus` |
/// | Timeout | `FetchError::Network("request timed out")` |
/// | Connection refused / DNS / TLS | `FetchError::Network` |
#[derive(Debug, Clone)]
pub struct Retriever {
    client: Client,
}

impl Retriever {
    /// Creates a retriever from configuration
    pub fn new(fetch: &FetchConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(fetch, user_agent)?,
        })
    }

    /// Wraps an existing client
    ///
    /// The client must have a finite timeout configured.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for Retriever {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(classify_error)?;
        Ok(FetchedPage {
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Maps a reqwest error to a network failure description
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request timed out".to_string())
    } else if e.is_connect() {
        FetchError::Network(format!("connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}
