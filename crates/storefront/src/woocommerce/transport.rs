//! HTTP transport behind the WooCommerce client.
//!
//! [`WooClient`](super::WooClient) builds fully authenticated URLs and hands
//! them to a [`Transport`]. The production transport is reqwest; tests swap
//! in a stub that counts calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Response header carrying the total number of records in the collection.
pub const TOTAL_COUNT_HEADER: &str = "X-WP-Total";

/// Response header carrying the total number of pages for the query.
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

const USER_AGENT: &str = concat!("woo-storefront/", env!("CARGO_PKG_VERSION"));

/// What a transport hands back for one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
    /// Parsed `X-WP-Total`, if present.
    pub total_count: Option<u64>,
    /// Parsed `X-WP-TotalPages`, if present.
    pub total_pages: Option<u32>,
}

impl RawResponse {
    /// A 200 response with a body and no pagination headers.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            total_count: None,
            total_pages: None,
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs one GET. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` (already carrying auth and paging parameters).
    async fn get(&self, url: Url) -> Result<RawResponse, StoreError>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the HTTP client fails to build.
    pub fn new(timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            // The URL carries the consumer secret.
            StoreError::Transport(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, StoreError> {
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let total_count = header_number(response.headers(), TOTAL_COUNT_HEADER);
        let total_pages = header_number(response.headers(), TOTAL_PAGES_HEADER);
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        debug!(
            path = %path,
            status = status.as_u16(),
            total_count = ?total_count,
            bytes = body.len(),
            "WooCommerce response"
        );

        Ok(RawResponse {
            status: status.as_u16(),
            body,
            total_count,
            total_pages,
        })
    }
}

/// Parse a numeric header, ignoring absent or malformed values.
fn header_number<N: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<N> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<N>().ok())
}
