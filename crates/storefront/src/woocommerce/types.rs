//! Schemas for the WooCommerce REST resources the storefront reads.
//!
//! Each resource gets an explicit type. Fields the storefront relies on are
//! required, so a shape mismatch fails fast as [`crate::StoreError::Decode`]
//! instead of surfacing later as a missing value. Fields WooCommerce omits
//! for some records carry `#[serde(default)]`.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use woo_storefront_core::{
    CategoryId, CouponId, CurrencyCode, CustomerId, DiscountType, Email, ImageId, LineItemId,
    OrderId, OrderStatus, ProductId, ReviewId, ReviewStatus, StockStatus, VariationId,
    parse_amount,
};

// =============================================================================
// Shared Types
// =============================================================================

/// Product, variation or category image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// WordPress media ID (0 for placeholders).
    #[serde(default = "placeholder_image_id")]
    pub id: ImageId,
    /// Image URL.
    pub src: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: String,
}

const fn placeholder_image_id() -> ImageId {
    ImageId::new(0)
}

/// WooCommerce money fields are strings, but some extensions emit numbers.
/// Either form is kept as the decimal string it represents.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

/// WooCommerce reports `date_created` in the site's timezone and
/// `date_created_gmt` in UTC. Prefer the GMT field; fall back to reading the
/// local one as UTC.
fn created_at(gmt: Option<NaiveDateTime>, local: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    gmt.or(local).map(|naive| naive.and_utc())
}

// =============================================================================
// Order Types
// =============================================================================

/// An order from `GET /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub currency: CurrencyCode,
    /// Grand total as a decimal string.
    #[serde(deserialize_with = "string_or_number")]
    pub total: String,
    /// `0` for guest checkouts.
    pub customer_id: CustomerId,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_created_gmt: Option<NaiveDateTime>,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Parsed grand total, `None` if WooCommerce sent something unparseable.
    #[must_use]
    pub fn total_amount(&self) -> Option<Decimal> {
        parse_amount(&self.total)
    }

    /// Creation instant in UTC.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(self.date_created_gmt, self.date_created)
    }
}

/// Billing address block of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl Billing {
    /// "First Last", trimmed. Empty when both parts are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// The billing email, if it is a usable address.
    #[must_use]
    pub fn parsed_email(&self) -> Option<Email> {
        Email::parse(&self.email).ok()
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub total: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// A product from `GET /products` or `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    /// `simple`, `variable`, `grouped` or `external`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub regular_price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sale_price: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    /// IDs of the variations of a `variable` product.
    #[serde(default)]
    pub variations: Vec<VariationId>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub average_rating: String,
    #[serde(default)]
    pub rating_count: u32,
}

impl Product {
    /// Current selling price.
    #[must_use]
    pub fn price_amount(&self) -> Option<Decimal> {
        parse_amount(&self.price)
    }

    /// Whether a sale price is active.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        match (parse_amount(&self.sale_price), parse_amount(&self.regular_price)) {
            (Some(sale), Some(regular)) => sale < regular,
            _ => false,
        }
    }
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A category from `GET /products/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Parent category ID, `0` for top level.
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub description: String,
    /// Number of published products in the category.
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub image: Option<Image>,
}

/// A variation from `GET /products/{id}/variations/{variation_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub regular_price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sale_price: String,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
    #[serde(default)]
    pub image: Option<Image>,
}

impl Variation {
    /// "Color: Red, Size: M".
    #[must_use]
    pub fn label(&self) -> String {
        self.attributes
            .iter()
            .map(|a| format!("{}: {}", a.name, a.option))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One attribute choice of a variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    pub name: String,
    pub option: String,
}

// =============================================================================
// Review Types
// =============================================================================

/// A review from `GET /products/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub reviewer_email: String,
    /// Review body (HTML).
    #[serde(default)]
    pub review: String,
    /// 0-5 stars.
    pub rating: u8,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_created_gmt: Option<NaiveDateTime>,
}

impl Review {
    /// Creation instant in UTC.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(self.date_created_gmt, self.date_created)
    }
}

// =============================================================================
// Coupon Types
// =============================================================================

/// A coupon from `GET /coupons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    /// Discount amount as a decimal string.
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_expires: Option<NaiveDateTime>,
    #[serde(default)]
    pub usage_count: u32,
}
