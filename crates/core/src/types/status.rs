//! Status enums reported by WooCommerce.
//!
//! Every enum carries an `Unknown` catch-all: extensions register their own
//! order statuses and the storefront must still decode those orders.

use serde::{Deserialize, Serialize};

/// Order status.
///
/// Maps to WooCommerce's `status` field on `orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    Trash,
    CheckoutDraft,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Trash => "trash",
            Self::CheckoutDraft => "checkout-draft",
            Self::Unknown => "unknown",
        };
        f.pad(label)
    }
}

/// Product stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::InStock => "in stock",
            Self::OutOfStock => "out of stock",
            Self::OnBackorder => "on backorder",
            Self::Unknown => "unknown",
        })
    }
}

/// Coupon discount type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percent,
    #[default]
    FixedCart,
    FixedProduct,
    #[serde(other)]
    Unknown,
}

/// Product review moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Approved,
    Hold,
    Spam,
    Trash,
    #[serde(other)]
    Unknown,
}
