//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - One GET per call, authenticated with `consumer_key`/`consumer_secret`
//!   query parameters (the REST API's key-pair auth over HTTPS)
//! - WooCommerce is the source of truth: no local sync, direct API calls
//! - Products and categories are cached in memory via `moka` (5 minute TTL)
//! - The network sits behind [`Transport`] so the paging and aggregation
//!   layers can be exercised against a stub
//!
//! # Example
//!
//! ```rust,ignore
//! use woo_storefront::woocommerce::{PageRequest, WooClient};
//! use woo_storefront::woocommerce::types::Order;
//!
//! let client = WooClient::new(&config)?;
//! let page = client
//!     .fetch_page::<Order>(&PageRequest::new("orders", 1, 100))
//!     .await?;
//! println!("{} of {:?} orders", page.items.len(), page.total_count);
//! ```

mod cache;
pub mod transport;
pub mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use woo_storefront_core::ProductId;

use crate::config::{Credentials, FetchLimits, WooConfig};
use crate::error::StoreError;

use cache::{CacheKey, CacheValue};
pub use transport::{HttpTransport, RawResponse, Transport};
use types::{Category, Product};

/// Path of the REST API below the store root.
pub const API_PREFIX: &str = "wp-json/wc/v3";

/// Largest `per_page` WooCommerce accepts.
pub const MAX_PER_PAGE: u32 = 100;

// =============================================================================
// Requests and Pages
// =============================================================================

/// One page of a named resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Resource path below the API prefix (e.g., `orders`, `products/reviews`)
    pub resource: String,
    /// 1-based page number
    pub page: u32,
    /// Page size, `1..=100`
    pub per_page: u32,
    /// Additional query parameters (filters such as `product` or `featured`)
    pub extra_params: BTreeMap<String, String>,
}

impl PageRequest {
    /// Create a request. `page` is raised to at least 1 and `per_page` is
    /// clamped into `1..=100`.
    #[must_use]
    pub fn new(resource: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            resource: resource.into(),
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            extra_params: BTreeMap::new(),
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    /// Add many query parameters.
    #[must_use]
    pub fn with_params(mut self, params: &BTreeMap<String, String>) -> Self {
        self.extra_params
            .extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

/// Decoded page plus the collection metadata WooCommerce reported with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<I> {
    pub items: Vec<I>,
    /// `X-WP-Total`; stable across pages of the same query
    pub total_count: Option<u64>,
    /// `X-WP-TotalPages`
    pub total_pages: Option<u32>,
}

// =============================================================================
// WooClient
// =============================================================================

/// Client for the WooCommerce REST API.
pub struct WooClient<T = HttpTransport> {
    inner: Arc<WooClientInner<T>>,
}

struct WooClientInner<T> {
    transport: T,
    credentials: Option<Credentials>,
    limits: FetchLimits,
    cache: Cache<CacheKey, CacheValue>,
}

impl<T> Clone for WooClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for WooClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooClient")
            .field("credentials", &self.inner.credentials)
            .field("limits", &self.inner.limits)
            .finish_non_exhaustive()
    }
}

impl WooClient<HttpTransport> {
    /// Create a client over HTTP from the startup configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WooConfig) -> Result<Self, StoreError> {
        let transport = HttpTransport::new(config.fetch.request_timeout)?;
        Ok(Self::with_transport(
            transport,
            config.credentials.clone(),
            config.fetch,
        ))
    }
}

impl<T: Transport> WooClient<T> {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(
        transport: T,
        credentials: Option<Credentials>,
        limits: FetchLimits,
    ) -> Self {
        Self {
            inner: Arc::new(WooClientInner {
                transport,
                credentials,
                limits,
                cache: cache::build(),
            }),
        }
    }

    /// Request and collection limits this client was built with.
    #[must_use]
    pub fn limits(&self) -> FetchLimits {
        self.inner.limits
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Fetch one page of a collection.
    ///
    /// # Errors
    ///
    /// - `AuthMissing` if no credentials are configured (nothing is sent)
    /// - `Transport`/`Timeout` if the request fails
    /// - `Api` for non-2xx responses
    /// - `Decode` if the body is not an array of `I`
    #[instrument(skip(self), fields(resource = %request.resource, page = request.page))]
    pub async fn fetch_page<I: DeserializeOwned>(
        &self,
        request: &PageRequest,
    ) -> Result<Page<I>, StoreError> {
        let mut query = vec![
            ("per_page".to_string(), request.per_page.to_string()),
            ("page".to_string(), request.page.to_string()),
        ];
        query.extend(
            request
                .extra_params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let response = self.get(&request.resource, &query).await?;
        let items: Vec<I> = decode(&request.resource, &response.body)?;

        debug!(
            items = items.len(),
            total_count = ?response.total_count,
            "Fetched page"
        );

        Ok(Page {
            items,
            total_count: response.total_count,
            total_pages: response.total_pages,
        })
    }

    /// Fetch a single record (e.g., `products/22` or `products/22/variations/23`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_page`], with `Decode` if the body is not one `I`.
    #[instrument(skip(self))]
    pub async fn fetch_record<I: DeserializeOwned>(&self, path: &str) -> Result<I, StoreError> {
        let response = self.get(path, &[]).await?;
        decode(path, &response.body)
    }

    /// Fetch a product by ID, served from cache when possible.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_record`].
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.fetch_record(&format!("products/{id}")).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Cached category list, if a previous call stored one.
    pub(crate) async fn cached_categories(&self) -> Option<Vec<Category>> {
        match self.inner.cache.get(&CacheKey::Categories).await {
            Some(CacheValue::Categories(categories)) => Some(categories),
            _ => None,
        }
    }

    pub(crate) async fn store_categories(&self, categories: Vec<Category>) {
        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories))
            .await;
    }

    /// Build the authenticated URL and perform the GET.
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, StoreError> {
        let url = self.endpoint(path, query)?;
        let response = self.inner.transport.get(url).await?;

        if !response.is_success() {
            let message = api_error_message(&response.body);
            warn!(
                path = %path,
                status = response.status,
                message = %message,
                "WooCommerce API returned non-success status"
            );
            return Err(StoreError::Api {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }

    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, StoreError> {
        let credentials = self
            .inner
            .credentials
            .as_ref()
            .filter(|c| !c.is_incomplete())
            .ok_or(StoreError::AuthMissing)?;

        let mut url = api_url(&credentials.domain, path)?;
        url.query_pairs_mut()
            .append_pair("consumer_key", credentials.consumer_key.expose_secret())
            .append_pair(
                "consumer_secret",
                credentials.consumer_secret.expose_secret(),
            )
            .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(url)
    }
}

/// `https://{domain}/wp-json/wc/v3/{path}`. A domain that already names a
/// scheme is used as-is.
fn api_url(domain: &str, path: &str) -> Result<Url, StoreError> {
    let domain = domain.trim().trim_end_matches('/');
    let root = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    };
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{root}/{API_PREFIX}/{path}"))
        .map_err(|e| StoreError::InvalidDomain(format!("{domain}: {e}")))
}

fn decode<I: DeserializeOwned>(resource: &str, body: &str) -> Result<I, StoreError> {
    serde_json::from_str(body).map_err(|source| {
        warn!(
            resource = %resource,
            error = %source,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to decode WooCommerce response"
        );
        StoreError::Decode {
            resource: resource.to_string(),
            source,
        }
    })
}

/// WooCommerce errors look like `{"code": "...", "message": "...", "data": {...}}`.
fn api_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ApiError {
        code: String,
        message: String,
    }

    serde_json::from_str::<ApiError>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |e| format!("{} ({})", e.message, e.code),
    )
}
