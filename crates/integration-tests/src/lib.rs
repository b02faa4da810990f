//! Integration tests for Woo Storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Stubbed store (no network)
//! cargo test -p woo-storefront-integration-tests
//!
//! # Against a real store (reads WOO_* variables or woo-settings.json)
//! cargo test -p woo-storefront-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `collection` - full-collection fetch through the public API
//! - `pagination` - shop grid paging and overlapping page requests
//! - `storefront_flows` - end-to-end command flows over a stubbed store
//! - `live_store` - read-only smoke test against a configured store
//!
//! This library holds JSON fixtures shaped like WooCommerce REST responses.

use serde_json::{Value, json};

/// An order as `GET /orders` returns it.
#[must_use]
pub fn order(id: u64, customer_id: u64, email: &str, name: (&str, &str), total: &str, created_gmt: &str) -> Value {
    json!({
        "id": id,
        "number": id.to_string(),
        "status": "completed",
        "currency": "USD",
        "total": total,
        "customer_id": customer_id,
        "date_created": created_gmt,
        "date_created_gmt": created_gmt,
        "billing": {
            "first_name": name.0,
            "last_name": name.1,
            "email": email,
        },
        "line_items": [],
    })
}

/// A simple product as `GET /products` returns it.
#[must_use]
pub fn product(id: u64, name: &str, price: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "type": "simple",
        "featured": false,
        "price": price,
        "regular_price": price,
        "sale_price": "",
        "stock_status": "instock",
        "images": [],
        "categories": [],
        "variations": [],
        "average_rating": "0.00",
        "rating_count": 0,
    })
}

/// A product review as `GET /products/reviews` returns it.
#[must_use]
pub fn review(id: u64, product_id: u64, rating: u8, created_gmt: &str) -> Value {
    json!({
        "id": id,
        "product_id": product_id,
        "product_name": format!("Product {product_id}"),
        "status": "approved",
        "reviewer": "Reviewer",
        "reviewer_email": "reviewer@example.com",
        "review": "<p>Nice.</p>",
        "rating": rating,
        "verified": true,
        "date_created": created_gmt,
        "date_created_gmt": created_gmt,
    })
}

/// A coupon as `GET /coupons` returns it.
#[must_use]
pub fn coupon(id: u64, code: &str, amount: &str) -> Value {
    json!({
        "id": id,
        "code": code,
        "amount": amount,
        "discount_type": "fixed_cart",
        "usage_count": 0,
    })
}
