//! Order history and customer analytics commands.

use chrono::Utc;
use woo_storefront::analytics::{RankedCustomer, TopClientsReport};
use woo_storefront::pagination::local_page;
use woo_storefront::{WooClient, WooConfig};
use woo_storefront_core::Price;

/// `woo orders --page N`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn history(
    client: &WooClient,
    config: &WooConfig,
    page: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let orders = client.order_history().await?;
    let view = local_page(&orders, page, config.display.orders_per_page);

    for order in view.items {
        let total = order.total_amount().map_or_else(
            || order.total.clone(),
            |amount| Price::new(amount, order.currency).to_string(),
        );
        let date = order
            .created_at()
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        println!(
            "#{:<8} {date}  {:<12} {:>12}  {}",
            order.id,
            order.status,
            total,
            order.billing.full_name()
        );
    }
    println!(
        "Page {} of {} ({} orders)",
        view.current_page,
        view.total_pages.max(1),
        orders.len()
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_ranking(title: &str, ranking: &[RankedCustomer]) {
    println!("{title}");
    if ranking.is_empty() {
        println!("  (no orders)");
    }
    for (position, customer) in ranking.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {:>12}  {} orders",
            position + 1,
            customer.name,
            customer.total.round_dp(2),
            customer.order_count
        );
    }
}

/// `woo customers --page N --top N`
///
/// # Errors
///
/// Propagates client errors.
#[allow(clippy::print_stdout)]
pub async fn customers(
    client: &WooClient,
    config: &WooConfig,
    page: usize,
    top: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let orders = client.order_history().await?;
    let report = TopClientsReport::build(&orders, Utc::now(), top)?;

    print_ranking(
        &format!(
            "Top clients since {}",
            report.last_two_months_range.start.format("%Y-%m-%d")
        ),
        &report.last_two_months,
    );
    print_ranking(
        &format!(
            "Top clients of {}",
            report.previous_year_range.start.format("%Y")
        ),
        &report.previous_year,
    );
    print_ranking("Top clients of all time", &report.all_time);

    let view = local_page(&report.customers, page, config.display.customers_per_page);
    println!("Customers");
    for customer in view.items {
        println!(
            "  {:<30} {:<30} {:>12}  {} orders",
            customer.name,
            customer.email,
            customer.lifetime_total.round_dp(2),
            customer.order_count
        );
    }
    println!("Page {} of {}", view.current_page, view.total_pages.max(1));
    Ok(())
}
