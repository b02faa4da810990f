//! Cache types for WooCommerce lookups that are repeated within a session.

use std::time::Duration;

use moka::future::Cache;
use woo_storefront_core::ProductId;

use super::types::{Category, Product};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Categories(Vec<Category>),
}

/// Build the lookup cache: 1000 entries, 5 minute TTL.
pub fn build() -> Cache<CacheKey, CacheValue> {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build()
}
