//! Coupon code lookup.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;
use woo_storefront_core::parse_amount;

use crate::error::StoreError;
use crate::woocommerce::types::Coupon;
use crate::woocommerce::{Transport, WooClient};

/// Why a coupon code could not be turned into a discount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// No coupon has this code.
    #[error("Invalid coupon code: {0}")]
    InvalidCode(String),

    /// The coupon exists but its amount is not a non-negative decimal.
    #[error("Coupon {code} has an unusable amount: {amount:?}")]
    AmountUnparseable { code: String, amount: String },
}

/// Discount amount of the coupon whose code is exactly `code`.
///
/// Matching is case-sensitive. The first coupon with the code wins.
///
/// # Errors
///
/// - `InvalidCode` if no coupon matches
/// - `AmountUnparseable` if the matching coupon's amount is not a
///   non-negative decimal
pub fn resolve(code: &str, coupons: &[Coupon]) -> Result<Decimal, CouponError> {
    let coupon = coupons
        .iter()
        .find(|c| c.code == code)
        .ok_or_else(|| CouponError::InvalidCode(code.to_string()))?;

    parse_amount(&coupon.amount)
        .filter(|amount| !amount.is_sign_negative())
        .ok_or_else(|| CouponError::AmountUnparseable {
            code: coupon.code.clone(),
            amount: coupon.amount.clone(),
        })
}

impl<T: Transport> WooClient<T> {
    /// Every coupon in the store.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::fetch_all`].
    #[instrument(skip(self))]
    pub async fn fetch_coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        self.fetch_all("coupons", &BTreeMap::new()).await
    }
}
