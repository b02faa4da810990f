//! Review commands.

use std::collections::BTreeMap;

use woo_storefront::WooClient;
use woo_storefront::analytics::{ReviewSummary, top_rated_products};
use woo_storefront::error::StoreError;
use woo_storefront::woocommerce::types::Review;
use woo_storefront_core::ProductId;

/// `woo reviews PRODUCT_ID`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn for_product(client: &WooClient, product_id: ProductId) -> Result<(), StoreError> {
    let reviews = client.product_reviews(product_id).await?;
    let summary = ReviewSummary::from_reviews(&reviews);

    match summary.average_rating {
        Some(average) => println!("Average rating {average} from {} reviews", summary.count),
        None => println!("No reviews for product {product_id}"),
    }
    for review in &reviews {
        let verified = if review.verified { " (verified)" } else { "" };
        println!(
            "  {} stars - {}{verified}: {}",
            review.rating,
            review.reviewer,
            review.review.trim()
        );
    }
    Ok(())
}

/// `woo reviews --limit N`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn latest(client: &WooClient, limit: u32) -> Result<(), StoreError> {
    let latest = client.latest_reviews(limit).await?;

    println!("Latest reviews ({})", latest.len());
    for entry in &latest {
        let review = &entry.review;
        let product = entry
            .product
            .as_ref()
            .map_or("(deleted product)", |product| product.name.as_str());
        let verified = if review.verified { " (verified)" } else { "" };
        println!(
            "  {} stars - {}{verified} on {product}: {}",
            review.rating,
            review.reviewer,
            review.review.trim()
        );
    }
    Ok(())
}

/// `woo top-rated --top N`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn top_rated(client: &WooClient, top: usize) -> Result<(), StoreError> {
    let reviews: Vec<Review> = client.fetch_all("products/reviews", &BTreeMap::new()).await?;

    for (position, product) in top_rated_products(&reviews, top).iter().enumerate() {
        println!(
            "{:>2}. {:<40} {} / 5 ({} reviews)",
            position + 1,
            product.name,
            product.average_rating,
            product.review_count
        );
    }
    Ok(())
}
