//! HTTP client with rate limiting awareness.
//!
//! Wraps reqwest with:
//! - Per-service base URL, user agent and optional bearer token
//! - Status code → [`ScoreError`] mapping
//! - Rate limit tracking from response headers and short throttling
//! - The configured [`RateLimitPolicy`] for rate-limited responses
//! - `Link: rel="next"` pagination for list endpoints

use crate::config::{NetworkConfig, RateLimitPolicy, ScoreConfig};
use crate::network::retry::{retry_async, RetryConfig, RetryDecision};
use crate::{Result, ScoreError};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Rate limit state extracted from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimitState {
    /// Remaining requests allowed.
    pub remaining: Option<u64>,
    /// Total request limit.
    pub limit: Option<u64>,
    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,
}

impl RateLimitState {
    /// Check if we should throttle requests.
    pub fn should_throttle(&self) -> bool {
        match (self.remaining, self.limit) {
            (Some(remaining), Some(limit)) if limit > 0 => {
                // Throttle when below 10% of limit
                let threshold = (limit as f64 * 0.1) as u64;
                remaining < threshold.max(1)
            }
            _ => false,
        }
    }

    /// Get time until rate limit resets.
    pub fn time_until_reset(&self) -> Option<Duration> {
        let reset = self.reset?;
        let now = unix_now();
        if reset > now {
            Some(Duration::from_secs(reset - now))
        } else {
            None
        }
    }
}

/// HTTP client bound to one upstream service.
pub struct HttpClient {
    client: Client,
    /// Service label used in errors and logs ("huggingface", "github").
    service: &'static str,
    base_url: String,
    token: Option<String>,
    accept: Option<&'static str>,
    policy: RateLimitPolicy,
    rate_limit_remaining: AtomicI64,
    rate_limit_limit: AtomicU64,
    rate_limit_reset: AtomicU64,
    throttle_delay: Duration,
    max_pages: u32,
}

impl HttpClient {
    /// Create a client for `service` rooted at `base_url`.
    pub fn new(
        service: &'static str,
        base_url: &str,
        token: Option<&str>,
        config: &ScoreConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ScoreError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            accept: None,
            policy: config.rate_limit_policy,
            rate_limit_remaining: AtomicI64::new(-1),
            rate_limit_limit: AtomicU64::new(0),
            rate_limit_reset: AtomicU64::new(0),
            throttle_delay: NetworkConfig::THROTTLE_DELAY,
            max_pages: NetworkConfig::MAX_LIST_PAGES,
        })
    }

    /// Send this `Accept` header with every request.
    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(accept);
        self
    }

    /// Cap on the pages [`get_all_pages`](Self::get_all_pages) will follow.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Whether requests carry a bearer token.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Get the current rate limit state.
    pub fn rate_limit_state(&self) -> RateLimitState {
        let remaining = self.rate_limit_remaining.load(Ordering::SeqCst);
        let limit = self.rate_limit_limit.load(Ordering::SeqCst);
        let reset = self.rate_limit_reset.load(Ordering::SeqCst);
        RateLimitState {
            remaining: (remaining >= 0).then_some(remaining as u64),
            limit: (limit > 0).then_some(limit),
            reset: (reset > 0).then_some(reset),
        }
    }

    /// GET `path` and deserialize the JSON body, honoring the rate-limit policy.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        self.with_policy(path, || self.get_once(&url, path, query))
            .await
    }

    /// GET every page of a JSON array endpoint, following `Link: rel="next"`.
    ///
    /// Never returns a truncated listing: a failing page, or more pages than
    /// the client's page cap, fails the whole call.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut url = self.url(path);
        let mut query = query;

        for page in 1..=self.max_pages {
            let (batch, next) = self
                .with_policy(path, || self.get_page::<T>(&url, path, query))
                .await?;
            items.extend(batch);

            match next {
                Some(next) => {
                    debug!("{} listing {} continues past page {}", self.service, path, page);
                    url = self.resolve_link(&next);
                    // the next link carries its own query string
                    query = &[];
                }
                None => return Ok(items),
            }
        }

        Err(ScoreError::Truncated {
            service: self.service.to_string(),
            resource: path.trim_start_matches('/').to_string(),
            pages: self.max_pages,
        })
    }

    // Internal methods

    async fn with_policy<T, F, Fut>(&self, resource: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let RateLimitPolicy::Backoff {
            max_attempts,
            max_wait,
        } = self.policy
        else {
            return operation().await;
        };

        let retry_config = RetryConfig::new()
            .with_max_attempts(max_attempts)
            .with_max_delay(max_wait);

        let (result, stats) = retry_async(&retry_config, operation, |e: &ScoreError| match e {
            ScoreError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => RetryDecision::RetryAfter(Duration::from_secs((*secs).max(1))),
            ScoreError::RateLimited { .. } => RetryDecision::Retry,
            _ => RetryDecision::Stop,
        })
        .await;

        if stats.attempts > 1 {
            debug!(
                "{} request {} finished after {} attempts",
                self.service, resource, stats.attempts
            );
        }
        result
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.send(url, resource, query).await?;
        self.parse_json(response, resource).await
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<(Vec<T>, Option<String>)> {
        let response = self.send(url, resource, query).await?;
        let next = next_link(response.headers());
        let items = self.parse_json(response, resource).await?;
        Ok((items, next))
    }

    async fn send(&self, url: &str, resource: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.maybe_throttle().await;

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(accept) = self.accept {
            request = request.header(header::ACCEPT, accept);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!("GET {}", url);
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScoreError::Timeout {
                    message: format!("GET {} timed out", url),
                }
            } else {
                ScoreError::Network {
                    message: format!("GET {} failed: {}", url, e),
                    cause: std::error::Error::source(&e).map(|s| s.to_string()),
                }
            }
        })?;

        self.update_rate_limits(&response);
        self.check_response_status(response, resource)
    }

    async fn parse_json<T: DeserializeOwned>(&self, response: Response, resource: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| ScoreError::Json {
            message: format!(
                "Failed to parse {} response for {}: {}",
                self.service, resource, e
            ),
            source: None,
        })
    }

    /// Absolute links are followed as given; anything else is rooted at the base URL.
    fn resolve_link(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            self.url(link)
        }
    }

    async fn maybe_throttle(&self) {
        let state = self.rate_limit_state();
        if state.should_throttle() {
            warn!(
                "{} rate limit approaching (remaining: {:?}/{:?}), throttling for {:?}",
                self.service, state.remaining, state.limit, self.throttle_delay
            );
            tokio::time::sleep(self.throttle_delay).await;
        }
    }

    fn update_rate_limits(&self, response: &Response) {
        let headers = response.headers();
        let parse = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        if let Some(remaining) = parse("x-ratelimit-remaining") {
            self.rate_limit_remaining
                .store(remaining as i64, Ordering::SeqCst);
        }
        if let Some(limit) = parse("x-ratelimit-limit") {
            self.rate_limit_limit.store(limit, Ordering::SeqCst);
        }
        if let Some(reset) = parse("x-ratelimit-reset") {
            self.rate_limit_reset.store(reset, Ordering::SeqCst);
        }

        let state = self.rate_limit_state();
        if let (Some(remaining), Some(limit)) = (state.remaining, state.limit) {
            debug!("{} rate limit: {}/{}", self.service, remaining, limit);
        }
    }

    fn check_response_status(&self, response: Response, resource: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let resource = resource.trim_start_matches('/').to_string();
        let service = self.service.to_string();

        let quota_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false);

        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && quota_exhausted)
        {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .or_else(|| {
                    self.rate_limit_state()
                        .time_until_reset()
                        .map(|d| d.as_secs())
                });

            return Err(ScoreError::RateLimited {
                service,
                retry_after_secs: retry_after,
            });
        }

        Err(match status {
            StatusCode::NOT_FOUND => ScoreError::NotFound { service, resource },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScoreError::Unauthorized {
                service,
                resource,
                status: status.as_u16(),
            },
            _ => ScoreError::Api {
                service,
                resource,
                status: status.as_u16(),
            },
        })
    }
}

/// Target of the `rel="next"` entry of a `Link` header.
fn next_link(headers: &header::HeaderMap) -> Option<String> {
    let link = headers.get(header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        is_next.then(|| {
            target
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
