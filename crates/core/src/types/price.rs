//! Money amounts using decimal arithmetic.
//!
//! WooCommerce serializes every monetary field (`total`, `price`, coupon
//! `amount`) as a decimal string. [`parse_amount`] is the single place those
//! strings become [`Decimal`]s.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parse a WooCommerce money string.
///
/// Returns `None` for empty or non-numeric input. Surrounding whitespace is
/// ignored. Negative values parse; callers decide whether they are valid.
///
/// ```
/// use rust_decimal::Decimal;
/// use woo_storefront_core::parse_amount;
///
/// assert_eq!(parse_amount("19.99"), Some(Decimal::new(1999, 2)));
/// assert_eq!(parse_amount(""), None);
/// assert_eq!(parse_amount("n/a"), None);
/// ```
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., pounds, not pence).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Some(symbol) => write!(f, "{symbol}{rounded:.2}"),
            None => write!(f, "{rounded:.2}"),
        }
    }
}

/// ISO 4217 currency codes a WooCommerce store commonly reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    /// Any currency the storefront has no symbol for.
    #[serde(other)]
    Other,
}

impl CurrencyCode {
    /// Display symbol, if one is known.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD | Self::CAD | Self::AUD => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::Other => None,
        }
    }
}
