//! Rate-limited API client
//!
//! This module handles every HTTP request the crawler makes:
//! - Building the HTTP client with a proper user agent string
//! - Injecting the API key and response format into each request
//! - Holding each request at the pacing gate until the minimum interval has passed
//! - Classifying transport and HTTP failures into [`FetchFailure`]

use crate::config::ApiConfig;
use crate::state::PacingGate;
use crate::{FetchFailure, FetchResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Query keys the client injects itself
pub const RESERVED_PARAMS: [&str; 2] = ["api_key", "format"];

/// User agent sent with every request
pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A single API call: an operation name plus its query parameters
///
/// Parameters are kept sorted so request URLs are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    params: BTreeMap<String, String>,
}

impl ApiRequest {
    /// Creates a request for the given API operation (e.g. `user.getfriends`)
    pub fn new(method: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("method".to_string(), method.to_string());
        Self { params }
    }

    /// Sets the entity the operation applies to
    pub fn user(self, user: &str) -> Self {
        self.param("user", user)
    }

    /// Sets the page size
    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit.to_string())
    }

    /// Sets the 1-indexed page number
    pub fn page(self, page: u32) -> Self {
        self.param("page", page.to_string())
    }

    /// Sets an arbitrary query parameter, replacing any previous value
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn method(&self) -> &str {
        self.get("method").unwrap_or_default()
    }

    /// Returns the first reserved key present in this request, if any
    pub fn reserved_key(&self) -> Option<&'static str> {
        RESERVED_PARAMS
            .into_iter()
            .find(|key| self.params.contains_key(*key))
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Anything that answers an [`ApiRequest`] with a JSON document
///
/// The fetch layer and crawl policies only depend on this trait;
/// [`RateLimitedClient`] is the production implementation.
#[async_trait]
pub trait JsonSource: Send {
    /// Issues one request. Failures are values, never panics.
    async fn get(&mut self, request: &ApiRequest) -> FetchResult<Value>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The API access configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP client that sends every request through one pacing gate
///
/// Construct exactly one per process: the gate is per instance, so a single
/// instance is what keeps the whole run within the remote rate limit.
pub struct RateLimitedClient {
    http: Client,
    base_url: Url,
    api_key: String,
    gate: PacingGate,
}

impl RateLimitedClient {
    /// Creates a client from the API configuration
    ///
    /// # Returns
    ///
    /// * `Ok(RateLimitedClient)` - Client ready to dispatch
    /// * `Err(CrawlError)` - The base URL is invalid or the HTTP client could not be built
    pub fn new(config: &ApiConfig) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            crate::ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;
        let http = build_http_client(config)?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            gate: PacingGate::new(Duration::from_millis(config.min_interval_ms)),
        })
    }

    /// Overrides the minimum interval between dispatches
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.gate = PacingGate::new(min_interval);
        self
    }

    /// Returns the pacing gate state (dispatch count, last dispatch time)
    pub fn gate(&self) -> &PacingGate {
        &self.gate
    }

    /// Fetches one API response
    ///
    /// # Request Flow
    ///
    /// 1. Reject requests that carry a reserved key
    /// 2. Wait at the pacing gate, then record the dispatch
    /// 3. Send GET with `api_key` and `format=json` injected
    /// 4. Log `<status>: Retrieved <url>` with the key redacted
    ///
    /// # Failure Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 200, JSON body | `Ok(value)` |
    /// | HTTP 200, bad body | `Decode` |
    /// | Other status | `Status(code)` |
    /// | Timeout / connect / DNS | `Unreachable` |
    pub async fn fetch(&mut self, request: &ApiRequest) -> FetchResult<Value> {
        if let Some(key) = request.reserved_key() {
            tracing::warn!(
                "Refusing {} request carrying reserved key '{}'",
                request.method(),
                key
            );
            return Err(FetchFailure::ReservedParameter(key.to_string()));
        }

        let mut query: Vec<(&str, &str)> = request.params().collect();
        query.push(("api_key", self.api_key.as_str()));
        query.push(("format", "json"));

        let http_request = match self.http.get(self.base_url.clone()).query(&query).build() {
            Ok(r) => r,
            Err(e) => {
                let shown_url = format!("{}?method={}", self.base_url, request.method());
                return Err(unreachable(&shown_url, e.to_string()));
            }
        };
        let shown_url = redact_api_key(http_request.url());

        self.gate.wait_turn().await;

        let response = match self.http.execute(http_request).await {
            Ok(response) => response,
            Err(e) => {
                return Err(unreachable(&shown_url, classify_transport_error(&e)));
            }
        };

        let status = response.status();
        tracing::info!("{}: Retrieved {}", status.as_u16(), shown_url);

        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::Decode(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchFailure::Decode(e.to_string()))
    }
}

#[async_trait]
impl JsonSource for RateLimitedClient {
    async fn get(&mut self, request: &ApiRequest) -> FetchResult<Value> {
        self.fetch(request).await
    }
}

/// Logs the request line for a request that never got a response
fn unreachable(shown_url: &str, reason: String) -> FetchFailure {
    tracing::warn!("unreachable: Retrieved {} ({})", shown_url, reason);
    FetchFailure::Unreachable(reason)
}

/// Maps a transport error to a short reason string
fn classify_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}

/// Renders a request URL with the API key value masked
fn redact_api_key(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "api_key" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
