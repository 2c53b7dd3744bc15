//! HTTP client for the remote API.
//!
//! Wraps a shared `reqwest::Client` with endpoint validation, global rate
//! limiting, HTTP status classification, and a budgeted response cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::api::response_cache::ResponseCache;
use crate::api::{ApiError, ApiResult};
use crate::importer::config::MIN_REQUEST_INTERVAL;
use crate::importer::rate_limit::RateLimiter;
use crate::metrics;
use crate::{MoveDetail, Pokemon, ResourcePage};

/// Base URL of the remote API.
pub const BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Fixed client identifier sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("pokefetch/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout covering the whole exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the remote API.
///
/// Cheap to share behind an [`Arc`]; the rate limiter passed to
/// [`ApiClient::new`] must be the one instance shared by all outbound
/// calls in the process.
pub struct ApiClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
    min_interval: Duration,
    response_cache: ResponseCache,
    requests_sent: AtomicU64,
}

impl ApiClient {
    /// Create a new client against the production base URL.
    pub fn new(rate_limiter: Arc<RateLimiter>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .gzip(true)
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| ApiError::NetworkFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            rate_limiter,
            min_interval: MIN_REQUEST_INTERVAL,
            response_cache: ResponseCache::new(),
            requests_sent: AtomicU64::new(0),
        })
    }

    /// Override the base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the minimum interval between dispatched requests.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Number of requests actually dispatched to the network (cache hits
    /// excluded).
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    /// Number of cached response bodies.
    pub fn response_cache_len(&self) -> usize {
        self.response_cache.len()
    }

    /// Approximate bytes held by the response cache.
    pub fn response_cache_bytes(&self) -> usize {
        self.response_cache.approximate_bytes()
    }

    /// Drop all cached response bodies.
    pub fn clear_response_cache(&self) {
        self.response_cache.clear();
    }

    /// Fetch one Pokémon record by id or canonical name.
    pub async fn fetch_pokemon(&self, key: &str) -> ApiResult<Pokemon> {
        self.get(&format!("/pokemon/{key}")).await
    }

    /// Fetch one move record by id or canonical name.
    pub async fn fetch_move(&self, key: &str) -> ApiResult<MoveDetail> {
        self.get(&format!("/move/{key}")).await
    }

    /// Fetch one page of the Pokémon listing.
    pub async fn list_pokemon(&self, limit: u32, offset: u32) -> ApiResult<ResourcePage> {
        self.get(&format!("/pokemon?limit={limit}&offset={offset}"))
            .await
    }

    /// Execute a GET request against `endpoint` (path and query relative to
    /// the base URL) and decode the response body into `T`.
    ///
    /// A well-formed endpoint is required before anything is dispatched; a
    /// cached body short-circuits the network entirely and consumes no
    /// rate-limit budget. Every dispatched request updates the rate
    /// limiter's timestamp, whatever its outcome.
    pub async fn get<T>(&self, endpoint: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let raw = format!("{}{}", self.base_url, endpoint);
        let url = Url::parse(&raw).map_err(|_| ApiError::InvalidEndpoint(raw.clone()))?;

        if let Some(body) = self.response_cache.get(url.as_str()) {
            debug!(url = %url, "response cache hit");
            metrics::record_cache_hit("response");
            return serde_json::from_slice(&body)
                .map_err(|e| ApiError::DecodingFailed(e.to_string()));
        }
        metrics::record_cache_miss("response");

        self.rate_limiter.wait(self.min_interval).await;
        self.requests_sent.fetch_add(1, Ordering::Relaxed);

        let started = Instant::now();
        debug!(url = %url, "dispatching GET request");

        let response = match self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                metrics::record_api_request(endpoint, "network_error", started.elapsed());
                warn!(url = %url, error = %e, "transport failure");
                return Err(ApiError::NetworkFailed(e.to_string()));
            }
        };

        let status = response.status();
        metrics::record_api_request(endpoint, status.as_str(), started.elapsed());

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| ApiError::NetworkFailed(e.to_string()))?;
            let decoded = serde_json::from_slice(&body)
                .map_err(|e| ApiError::DecodingFailed(e.to_string()))?;
            self.response_cache.insert(url.as_str(), &body);
            debug!(url = %url, bytes = body.len(), "request succeeded");
            return Ok(decoded);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(url = %url, "resource not found");
            return Err(ApiError::NotFound);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, "rate limited by remote API");
            metrics::record_rate_limited(endpoint);
            return Err(ApiError::RateLimited);
        }

        if status.is_server_error() {
            warn!(url = %url, status = status.as_u16(), "server error");
            return Err(ApiError::ServerError(status.as_u16()));
        }

        warn!(url = %url, status = status.as_u16(), "unexpected HTTP status");
        Err(ApiError::HttpError(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(RateLimiter::shared()).unwrap();
        assert_eq!(client.base_url, BASE_URL);
        assert_eq!(client.requests_sent(), 0);
    }

    #[test]
    fn test_base_url_override() {
        let client = ApiClient::new(RateLimiter::shared())
            .unwrap()
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(client.base_url, "http://127.0.0.1:9999");
    }

    #[tokio::test]
    async fn test_malformed_endpoint_fails_fast() {
        let client = ApiClient::new(RateLimiter::shared())
            .unwrap()
            .with_base_url("not a scheme");

        let result: ApiResult<Pokemon> = client.get("/pokemon/1").await;
        assert!(matches!(result, Err(ApiError::InvalidEndpoint(_))));
        // Nothing was dispatched
        assert_eq!(client.requests_sent(), 0);
    }
}
