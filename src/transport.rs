//! Resilient HTTP request execution
//!
//! Both API integrations go through a [`Transport`]. A request is described
//! by an immutable [`RequestDescriptor`]; the answer comes back as a
//! [`ResponseEnvelope`] holding status, headers and body. [`HttpExecutor`]
//! is the real implementation: it retries HTTP 429 using the server's
//! `retry-after` hint and hands every other status back to the caller
//! untouched.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::retry::{retry_after_delay, with_retry};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("playlist-bridge/", env!("CARGO_PKG_VERSION"));

/// Status code servers use to signal rate limiting
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Query parameters that carry credentials and never reach logs or errors
const SECRET_QUERY_PARAMS: &[&str] = &["key"];

const REDACTED: &str = "REDACTED";

/// HTTP method of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Read (GET)
    Get,
    /// Write (POST)
    Post,
}

impl Method {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Everything needed to send one request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: Url,
    method: Method,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Build a GET request with query parameters appended to `base`
    pub fn get<K, V>(base: &str, params: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::new(Method::Get, base, params)
    }

    /// Build a POST request with query parameters appended to `base`
    pub fn post<K, V>(base: &str, params: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::new(Method::Post, base, params)
    }

    fn new<K, V>(method: Method, base: &str, params: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = Url::parse_with_params(
            base,
            params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
        )?;

        Ok(Self {
            url,
            method,
            headers: BTreeMap::new(),
            body: None,
        })
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add an `Authorization: Bearer` header
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Attach a request body
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Target URL including the query string
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request headers
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Request body, if any
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Value of a query parameter, if present
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// URL safe for logs and error messages, credential parameters masked
    pub fn redacted_url(&self) -> String {
        let is_secret = |name: &str| SECRET_QUERY_PARAMS.contains(&name);
        if !self
            .url
            .query_pairs()
            .any(|(name, _)| is_secret(name.as_ref()))
        {
            return self.url.to_string();
        }

        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(name, value)| {
                let value = if is_secret(name.as_ref()) {
                    REDACTED.to_string()
                } else {
                    value.into_owned()
                };
                (name.into_owned(), value)
            })
            .collect();

        let mut url = self.url.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}

/// Status, headers and body of one response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: BTreeMap<String, String>,
    /// Raw body
    pub body: Vec<u8>,
}

impl ResponseEnvelope {
    /// Envelope with no headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a header, lower-casing its name
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// True for the statuses callers treat as success (200 and 201)
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// True when the server asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        self.status == STATUS_TOO_MANY_REQUESTS
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-accepted envelope for `request` into the matching error
    pub fn error_for_status(self, request: &RequestDescriptor) -> Result<Self> {
        if self.is_accepted() {
            Ok(self)
        } else if self.is_rate_limited() {
            Err(Error::RateLimited {
                url: request.redacted_url(),
            })
        } else {
            Err(Error::UnexpectedStatus {
                status: self.status,
                url: request.redacted_url(),
            })
        }
    }
}

/// Something that can execute a [`RequestDescriptor`]
///
/// Implementations return `Err` only when no response was obtained. Every
/// status code, including errors, comes back as an envelope.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the final response
    async fn execute(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope>;
}

/// [`Transport`] over `reqwest` with rate-limit retry
pub struct HttpExecutor {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpExecutor {
    /// Create an executor with its own HTTP client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(retry: RetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(retry.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, retry })
    }

    fn backoff_for(&self, result: &Result<ResponseEnvelope>) -> Duration {
        match result {
            Ok(response) => retry_after_delay(
                &response.headers,
                self.retry.retry_after_unit,
                self.retry.safety_margin,
            ),
            Err(_) => Duration::ZERO,
        }
    }

    /// One attempt, no retry
    async fn send_once(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope> {
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        // reqwest errors embed the request URL, credentials included
        let response = builder.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?
            .to_vec();

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpExecutor {
    async fn execute(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope> {
        tracing::debug!(
            method = request.method().as_str(),
            url = %request.redacted_url(),
            "sending request"
        );

        let outcome = with_retry(
            self.retry.max_attempts,
            |result: &Result<ResponseEnvelope>| {
                matches!(result, Ok(response) if response.is_rate_limited())
            },
            |result: &Result<ResponseEnvelope>| self.backoff_for(result),
            || self.send_once(request),
        )
        .await;

        let exhausted = outcome.is_exhausted();
        let attempts = outcome.attempts();
        let response = outcome.into_inner()?;

        if exhausted {
            tracing::warn!(
                url = %request.redacted_url(),
                attempts,
                "rate limit retries exhausted, returning last response"
            );
        } else if !response.is_accepted() {
            tracing::warn!(
                url = %request.redacted_url(),
                status = response.status,
                "request returned unexpected status"
            );
        }

        Ok(response)
    }
}
