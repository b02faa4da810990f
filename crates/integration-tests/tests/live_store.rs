//! Read-only smoke test against a real store.
//!
//! Requires WooCommerce credentials in `WOO_DOMAIN`, `WOO_CONSUMER_KEY` and
//! `WOO_CONSUMER_SECRET` (or `woo-settings.json`).
//!
//! Run with: cargo test -p woo-storefront-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use woo_storefront::{WooClient, WooConfig};

#[tokio::test]
#[ignore = "requires a live WooCommerce store"]
async fn test_live_store_first_page() {
    let config = WooConfig::from_env().unwrap();
    let client = WooClient::new(&config).unwrap();

    let listing = client.product_listing(config.display.products_per_page);
    let page = listing.fetch_page(1).await.unwrap().into_current().unwrap();

    assert!(page.items.len() <= config.display.products_per_page as usize);
    assert!(page.current_page <= page.total_pages.max(1));
}
