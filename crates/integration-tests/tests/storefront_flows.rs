//! End-to-end flows over a stubbed store: analytics, reviews, checkout.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use woo_storefront::analytics::{ReviewSummary, TopClientsReport};
use woo_storefront::checkout::CheckoutSummary;
use woo_storefront::coupon::{CouponError, resolve};
use woo_storefront::pagination::local_page;
use woo_storefront::testing::{self, StubTransport};
use woo_storefront_core::ProductId;
use woo_storefront_integration_tests::{coupon, order, product, review};

#[tokio::test]
async fn test_top_clients_from_paged_orders() {
    let mut orders = vec![
        order(1, 11, "ann@example.com", ("Ann", "Lee"), "10.00", "2024-05-01T09:00:00"),
        order(2, 12, "bob@example.com", ("Bob", "Ng"), "30.00", "2024-05-02T09:00:00"),
        order(3, 11, "ann@example.com", ("Ann", "Lee"), "5.00", "2024-05-03T09:00:00"),
    ];
    // Pad with old guest orders so the collection spans several pages.
    orders.extend((100..=260).map(|id| {
        order(id, 0, "", ("", ""), "1.00", "2020-01-01T00:00:00")
    }));
    let stub = StubTransport::new().with_items("orders", &orders, 100);
    let client = testing::client(stub);

    let history = client.order_history().await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let report = TopClientsReport::build(&history, now, 2).unwrap();

    let recent: Vec<(String, Decimal)> = report
        .last_two_months
        .iter()
        .map(|c| (c.name.clone(), c.total))
        .collect();
    assert_eq!(
        recent,
        vec![
            ("Bob Ng".to_string(), Decimal::from(30)),
            ("Ann Lee".to_string(), Decimal::from(15)),
        ]
    );
    assert!(report.previous_year.is_empty());
    // Anonymous guests are grouped per order.
    assert_eq!(report.customers.len(), 2 + 161);

    let second_page = local_page(&report.customers, 2, 10);
    assert_eq!(second_page.items.len(), 10);
    assert_eq!(second_page.total_pages, 17);
}

#[tokio::test]
async fn test_product_page_flow() {
    let stub = StubTransport::new()
        .with_record("products/22", product(22, "Hoodie", "45.00"))
        .with_pages(
            "products/reviews",
            vec![json!([
                review(1, 22, 5, "2024-01-01T00:00:00"),
                review(2, 22, 4, "2024-02-01T00:00:00"),
                review(3, 23, 1, "2024-02-01T00:00:00"),
            ])],
        );
    let client = testing::client(stub);

    let (detail, reviews) = tokio::try_join!(
        client.product_detail(ProductId::new(22)),
        client.product_reviews(ProductId::new(22))
    )
    .unwrap();
    let summary = ReviewSummary::from_reviews(&reviews);

    assert!(detail.variations.is_empty());
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average_rating, Some(Decimal::new(45, 1)));
}

#[tokio::test]
async fn test_checkout_with_coupon() {
    let stub = StubTransport::new().with_pages(
        "coupons",
        vec![json!([coupon(1, "SAVE10", "10.00"), coupon(2, "WELCOME", "5")])],
    );
    let client = testing::client(stub);

    let coupons = client.fetch_coupons().await.unwrap();
    let discount = resolve("SAVE10", &coupons).unwrap();
    let summary = CheckoutSummary::compute(Decimal::from(100), discount);

    assert_eq!(discount, Decimal::from(10));
    assert_eq!(summary.tax, Decimal::new(720, 2));
    assert_eq!(summary.grand_total, Decimal::new(10220, 2));

    assert_eq!(
        resolve("BOGUS", &coupons),
        Err(CouponError::InvalidCode("BOGUS".to_string()))
    );
}
