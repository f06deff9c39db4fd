//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`.
//! It handles base URL joining, default headers, request timeouts and
//! standardized JSON response handling. Non-2xx answers are not errors at
//! this level: they come back as an `ApiResponse` with `success == false`
//! so each caller decides what a failed status means for its domain.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Serialize};

/// Browser-like user agent. Yahoo answers 429 to the default reqwest agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

impl<T> ApiResponse<T> {
    /// Returns a response header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

/// A flexible asynchronous HTTP client.
///
/// Handles base URLs, default headers and timeouts. One instance is built per
/// upstream service and reused for the whole run.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying reqwest client.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// Headers sent with every request (per-request headers override them).
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Creates a new `ApiClient` instance.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://api.example.com/v1/").
    /// * `default_headers` - Headers attached to every request.
    /// * `timeout` - Per-request timeout.
    ///
    /// # Errors
    /// Fails if `base_url` is not an absolute URL or the TLS backend cannot be initialized.
    pub fn new(
        base_url: &str,
        default_headers: Option<HeaderMap>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let url = Url::parse(base_url)?;

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner,
            base_url: url,
            default_headers: default_headers.unwrap_or_default(),
        })
    }

    /// The base URL this client resolves paths against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a generic HTTP request and handles the response.
    ///
    /// This method manages URL joining, header injection, query strings and
    /// JSON serialization/deserialization.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, POST, etc.).
    /// * `path` - The relative path to append to the base URL. An empty path targets the base URL itself.
    /// * `query` - Query string pairs.
    /// * `headers` - Optional additional headers for this specific request.
    /// * `body` - Optional serializable object to send as the JSON body.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining, network execution or JSON
    /// decoding of a successful body fails. A JSON decoding failure carries a
    /// `serde_json::Error` that callers can downcast to.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        headers: Option<HeaderMap>,
        body: Option<B>,
    ) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        // 1. Construct the full absolute URL
        let full_url = self.base_url.join(path)?;
        let mut req = self
            .inner
            .request(method, full_url)
            .headers(self.default_headers.clone());

        if !self.default_headers.contains_key(USER_AGENT) {
            req = req.header(USER_AGENT, BROWSER_USER_AGENT);
        }

        if !query.is_empty() {
            req = req.query(query);
        }

        // 2. Add Custom Headers if provided
        if let Some(h) = headers {
            req = req.headers(h);
        }

        // 3. Serialize and attach the JSON body if present
        if let Some(b) = body {
            let json_body = serde_json::to_string(&b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        // 4. Execute the request and capture response metadata
        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();
        let success = status.is_success();

        // 5. Handle the result based on success status
        if success {
            let text = response.text().await?;
            // 204 No Content and friends: nothing to decode
            let data = if text.trim().is_empty() {
                None
            } else {
                Some(serde_json::from_str::<T>(&text)?)
            };
            Ok(ApiResponse {
                data,
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    /// Shorthand for a `GET` without body.
    pub async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: Option<HeaderMap>,
    ) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        self.request::<T, ()>(Method::GET, path, query, headers, None)
            .await
    }

    /// Fetches a path and returns the raw body text, whatever the content type.
    pub async fn get_text(&self, path: &str) -> anyhow::Result<ApiResponse<String>> {
        let full_url = self.base_url.join(path)?;
        let mut req = self
            .inner
            .get(full_url)
            .headers(self.default_headers.clone());
        if !self.default_headers.contains_key(USER_AGENT) {
            req = req.header(USER_AGENT, BROWSER_USER_AGENT);
        }

        let response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();
        let text = response.text().await?;

        Ok(ApiResponse {
            success: status.is_success(),
            status: status.as_u16(),
            data: status.is_success().then(|| text.clone()),
            error_body: (!status.is_success()).then_some(text),
            headers: resp_headers,
        })
    }
}
