//! In-memory transport for tests.
//!
//! Routes are keyed by the path below `/wp-json/wc/v3/` (`orders`,
//! `products/22`). Collection routes serve pre-built pages by the `page`
//! query parameter and return `[]` past the last one, the way WooCommerce
//! does. Every call is recorded.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use crate::config::{Credentials, FetchLimits};
use crate::error::StoreError;
use crate::woocommerce::{API_PREFIX, RawResponse, Transport, WooClient};

/// Consumer key used by [`credentials`].
pub const CONSUMER_KEY: &str = "ck_4f1c8e2b9a7d6350e1f2a3b4c5d6e7f8a9b0c1d2";

/// Consumer secret used by [`credentials`].
pub const CONSUMER_SECRET: &str = "cs_9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e0d";

/// Credentials for a store that only exists in the stub.
#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new("shop.example.test", CONSUMER_KEY, CONSUMER_SECRET)
}

/// A client over `stub` with test credentials and default limits.
#[must_use]
pub fn client(stub: StubTransport) -> WooClient<StubTransport> {
    WooClient::with_transport(stub, Some(credentials()), FetchLimits::default())
}

#[derive(Debug, Clone, Default)]
struct Route {
    pages: Vec<Value>,
    endless: Option<Value>,
    record: Option<Value>,
    total_count: Option<u64>,
    status: Option<(u16, String)>,
    failing_pages: HashSet<u32>,
    delays: HashMap<u32, Duration>,
}

/// Scripted [`Transport`] that never touches the network.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<Url>>,
}

impl StubTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&mut self, path: &str) -> &mut Route {
        self.routes.entry(path.to_string()).or_default()
    }

    /// Serve `pages[n - 1]` for `page=n`, and `[]` past the end.
    #[must_use]
    pub fn with_pages(mut self, resource: &str, pages: Vec<Value>) -> Self {
        self.route(resource).pages = pages;
        self
    }

    /// Serve the given items split into pages of `per_page`.
    #[must_use]
    pub fn with_items(self, resource: &str, items: &[Value], per_page: usize) -> Self {
        let pages = items
            .chunks(per_page.max(1))
            .map(|chunk| Value::Array(chunk.to_vec()))
            .collect();
        self.with_pages(resource, pages)
    }

    /// Serve the same non-empty page for every page number.
    #[must_use]
    pub fn with_endless_page(mut self, resource: &str, page: Value) -> Self {
        self.route(resource).endless = Some(page);
        self
    }

    /// Report `X-WP-Total` (and the matching `X-WP-TotalPages`).
    #[must_use]
    pub fn with_total_count(mut self, resource: &str, total: u64) -> Self {
        self.route(resource).total_count = Some(total);
        self
    }

    /// Serve a single JSON object at `path`.
    #[must_use]
    pub fn with_record(mut self, path: &str, record: Value) -> Self {
        self.route(path).record = Some(record);
        self
    }

    /// Answer every request to `path` with `status` and `body`.
    #[must_use]
    pub fn with_status(mut self, path: &str, status: u16, body: &str) -> Self {
        self.route(path).status = Some((status, body.to_string()));
        self
    }

    /// Fail `page` of `resource` at the transport level.
    #[must_use]
    pub fn with_failing_page(mut self, resource: &str, page: u32) -> Self {
        self.route(resource).failing_pages.insert(page);
        self
    }

    /// Delay the response for `page` of `resource`.
    #[must_use]
    pub fn with_delay(mut self, resource: &str, page: u32, delay: Duration) -> Self {
        self.route(resource).delays.insert(page, delay);
        self
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Every URL requested, in order.
    pub fn requests(&self) -> Vec<Url> {
        self.lock().clone()
    }

    /// The `page` parameter of each request to `resource`, in order.
    pub fn pages_requested(&self, resource: &str) -> Vec<u32> {
        self.lock()
            .iter()
            .filter(|url| relative_path(url) == resource)
            .map(|url| query_number(url, "page").unwrap_or(1))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Url>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, StoreError> {
        self.lock().push(url.clone());

        let path = relative_path(&url);
        let Some(route) = self.routes.get(&path) else {
            return Ok(RawResponse {
                status: 404,
                ..RawResponse::ok(
                    json!({
                        "code": "rest_no_route",
                        "message": "No route was found matching the URL and request method."
                    })
                    .to_string(),
                )
            });
        };

        let page = query_number(&url, "page").unwrap_or(1).max(1);
        let per_page = query_number(&url, "per_page").unwrap_or(10).max(1);

        if let Some(delay) = route.delays.get(&page) {
            tokio::time::sleep(*delay).await;
        }

        if route.failing_pages.contains(&page) {
            return Err(StoreError::Transport(format!(
                "connection reset while reading {path} page {page}"
            )));
        }

        if let Some((status, body)) = &route.status {
            return Ok(RawResponse {
                status: *status,
                ..RawResponse::ok(body.clone())
            });
        }

        if let Some(record) = &route.record {
            return Ok(RawResponse::ok(record.to_string()));
        }

        let index = usize::try_from(page - 1).unwrap_or(usize::MAX);
        let body = route
            .pages
            .get(index)
            .or(route.endless.as_ref())
            .cloned()
            .unwrap_or_else(|| json!([]));

        Ok(RawResponse {
            total_count: route.total_count,
            total_pages: route
                .total_count
                .and_then(|total| u32::try_from(total.div_ceil(u64::from(per_page))).ok()),
            ..RawResponse::ok(body.to_string())
        })
    }
}

fn relative_path(url: &Url) -> String {
    let prefix = format!("/{API_PREFIX}/");
    let path = url.path();
    path.strip_prefix(&prefix).unwrap_or(path).to_string()
}

fn query_number(url: &Url, name: &str) -> Option<u32> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse().ok())
}
