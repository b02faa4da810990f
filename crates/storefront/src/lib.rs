//! Woo Storefront library.
//!
//! Read-side client for a WooCommerce store: fetches paged REST collections,
//! walks whole collections, serves server-paginated views with
//! last-request-wins semantics, and rolls orders and reviews up into
//! per-customer and per-product analytics.
//!
//! # Layers
//!
//! - [`woocommerce`] - REST transport, schemas and the authenticated client
//! - [`collection`] - full-collection fetch (`fetch_all`)
//! - [`pagination`] - server-paginated and local page views
//! - [`aggregate`] - group-by-key rollups and ranking
//! - [`analytics`] - top clients and review summaries
//! - [`coupon`] / [`checkout`] - coupon resolution and checkout totals
//! - [`catalog`] - storefront read operations built from the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod analytics;
pub mod catalog;
pub mod checkout;
pub mod collection;
pub mod config;
pub mod coupon;
pub mod error;
pub mod pagination;
pub mod woocommerce;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{ConfigError, Credentials, WooConfig};
pub use error::StoreError;
pub use woocommerce::WooClient;
