//! Catalog commands: shop grid, featured products, categories, product page.

use woo_storefront::WooClient;
use woo_storefront::WooConfig;
use woo_storefront::analytics::ReviewSummary;
use woo_storefront::error::StoreError;
use woo_storefront::woocommerce::types::Product;
use woo_storefront_core::{CurrencyCode, Price, ProductId, parse_amount};

/// Format a product's current price, or "-" when it has none.
fn price_label(product: &Product) -> String {
    product
        .price_amount()
        .map_or_else(|| "-".to_string(), |amount| Price::new(amount, CurrencyCode::default()).to_string())
}

fn product_line(product: &Product) -> String {
    let sale = if product.on_sale() { " (sale)" } else { "" };
    format!(
        "#{:<6} {:<40} {:>10}{sale}  {}",
        product.id,
        product.name,
        price_label(product),
        product.stock_status
    )
}

/// `woo products --page N`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn products(client: &WooClient, config: &WooConfig, page: u32) -> Result<(), StoreError> {
    let listing = client.product_listing(config.display.products_per_page);
    let Some(view) = listing.go_to_page(page).await?.into_current() else {
        return Ok(());
    };

    for product in &view.items {
        println!("{}", product_line(product));
    }
    println!("Page {} of {}", view.current_page, view.total_pages.max(1));
    Ok(())
}

/// `woo featured`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn featured(client: &WooClient, limit: u32) -> Result<(), StoreError> {
    for product in client.featured_products(limit).await? {
        let badge = if product.featured { "FEATURED" } else { "NEW" };
        println!("[{badge}] {}", product_line(&product));
    }
    Ok(())
}

/// `woo categories`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn categories(client: &WooClient) -> Result<(), StoreError> {
    for category in client.categories().await? {
        println!("#{:<6} {:<30} {} products", category.id, category.name, category.count);
    }
    Ok(())
}

/// `woo product ID`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn product(client: &WooClient, id: ProductId) -> Result<(), StoreError> {
    let (detail, reviews) = tokio::try_join!(client.product_detail(id), client.product_reviews(id))?;
    let product = &detail.product;

    println!("{}", product.name);
    println!("Price: {}  Stock: {}", price_label(product), product.stock_status);
    if let Some(regular) = parse_amount(&product.regular_price).filter(|_| product.on_sale()) {
        println!("Was: {}", Price::new(regular, CurrencyCode::default()));
    }
    if !product.categories.is_empty() {
        let names: Vec<&str> = product.categories.iter().map(|c| c.name.as_str()).collect();
        println!("Categories: {}", names.join(", "));
    }

    for variation in &detail.variations {
        let price = parse_amount(&variation.price).map_or_else(
            || "-".to_string(),
            |amount| Price::new(amount, CurrencyCode::default()).to_string(),
        );
        println!("  - {:<30} {:>10}  {}", variation.label(), price, variation.stock_status);
    }

    let summary = ReviewSummary::from_reviews(&reviews);
    match summary.average_rating {
        Some(average) => println!("Rating: {average} / 5 ({} reviews)", summary.count),
        None => println!("No reviews yet"),
    }
    Ok(())
}
