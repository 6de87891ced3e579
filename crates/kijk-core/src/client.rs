//! HTTP client with rate limiting for kijk.nl
//!
//! Fetches video pages and DASH manifests. Failed requests are reported
//! to the caller as-is; nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{KijkError, Result};

const BASE_URL: &str = "https://www.kijk.nl";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin that page paths are fetched from (default: "https://www.kijk.nl")
    pub base_url: String,
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            requests_per_second: 2.0,
            timeout_secs: 30,
        }
    }
}

/// Rate limiter to control request frequency
///
/// Ensures requests are spaced at least `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// Non-positive rates disable limiting. Rates so small that the
    /// interval overflows `Duration` are clamped to `Duration::MAX`.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / requests_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Acquire permission to make a request
    ///
    /// Sleeps until `min_interval` has passed since the previous request.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// HTTP client wrapper for kijk.nl pages and CDN manifests
///
/// Handles rate limiting, browser-like headers and mapping of
/// HTTP status codes onto [`KijkError`].
#[derive(Debug)]
pub struct KijkClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl KijkClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT_LANGUAGE,
                    reqwest::header::HeaderValue::from_static("nl-NL,nl;q=0.9,en;q=0.8"),
                );
                headers
            })
            .build()
            .map_err(KijkError::HttpError)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a page from a path on the configured origin
    ///
    /// # Arguments
    /// * `path` - The path to fetch (e.g., "/films/video/the-bounty-hunter/CQvs74EAaJj")
    ///
    /// # Errors
    /// - `HttpError` - Network or HTTP errors
    /// - `NotFound` - Server returned 404
    /// - `RateLimited` - Server returned 429
    pub async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        self.fetch_url(&url).await
    }

    /// Fetch an absolute URL, such as a manifest on a CDN
    pub async fn fetch_url(&self, url: &str) -> Result<String> {
        self.rate_limiter.acquire().await;
        debug!(url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(KijkError::HttpError)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(KijkError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(KijkError::NotFound(url.to_string()));
        }

        let response = response.error_for_status().map_err(KijkError::HttpError)?;
        response.text().await.map_err(KijkError::HttpError)
    }

    /// Origin used by [`KijkClient::fetch`]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
