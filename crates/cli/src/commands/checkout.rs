//! `woo checkout`: coupon resolution and totals.

use rust_decimal::Decimal;
use woo_storefront::WooClient;
use woo_storefront::checkout::CheckoutSummary;
use woo_storefront::coupon::resolve;

/// Print checkout totals for `subtotal`, applying `coupon` if given.
///
/// # Errors
///
/// Returns error if coupons cannot be fetched or the code does not resolve.
#[allow(clippy::print_stdout)]
pub async fn totals(
    client: &WooClient,
    subtotal: Decimal,
    coupon: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let discount = match coupon {
        Some(code) => {
            let coupons = client.fetch_coupons().await?;
            let amount = resolve(code, &coupons)?;
            tracing::info!(code, %amount, "Coupon applied");
            amount
        }
        None => Decimal::ZERO,
    };

    let summary = CheckoutSummary::compute(subtotal, discount);
    println!("Subtotal:  {:>10}", summary.subtotal);
    println!("Discount: -{:>10}", summary.discount);
    println!("Shipping:  {:>10}", summary.shipping);
    println!("Tax:       {:>10}", summary.tax);
    println!("Total:     {:>10}", summary.grand_total);
    Ok(())
}
