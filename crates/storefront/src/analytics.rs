//! Customer spend and review analytics built on [`crate::aggregate`].

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use woo_storefront_core::{DateRange, DateRangeError, ProductId};

use crate::aggregate::{AggregateGroup, RankBy, Rollup, Window, aggregate, rank};
use crate::woocommerce::types::{Order, Review};

// =============================================================================
// Customer Spend
// =============================================================================

/// Groups orders by customer.
///
/// Registered customers are keyed by ID. Guests are keyed by their
/// normalized billing email, or by order when they left no usable email.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerSpend;

impl Rollup<Order> for CustomerSpend {
    fn key_of(&self, order: &Order) -> String {
        if !order.customer_id.is_guest() {
            return format!("customer:{}", order.customer_id);
        }
        order.billing.parsed_email().map_or_else(
            || format!("order:{}", order.id),
            |email| format!("email:{email}"),
        )
    }

    fn display_name_of(&self, order: &Order) -> String {
        let name = order.billing.full_name();
        if !name.is_empty() {
            return name;
        }
        let email = order.billing.email.trim();
        if email.is_empty() {
            "Guest".to_string()
        } else {
            email.to_string()
        }
    }

    fn amount_of(&self, order: &Order) -> Option<Decimal> {
        order.total_amount()
    }

    fn date_of(&self, order: &Order) -> Option<DateTime<Utc>> {
        order.created_at()
    }
}

/// One customer's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    pub key: String,
    pub name: String,
    /// Billing email from the customer's first order, if any
    pub email: String,
    pub lifetime_total: Decimal,
    pub order_count: usize,
    pub last_two_months_total: Decimal,
    pub previous_year_total: Decimal,
    /// Most recent dated order
    pub last_order_at: Option<DateTime<Utc>>,
}

/// A ranked entry: the total and order count within the ranking's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCustomer {
    pub key: String,
    pub name: String,
    pub total: Decimal,
    pub order_count: usize,
}

const LAST_TWO_MONTHS: usize = 0;
const PREVIOUS_YEAR: usize = 1;

/// Top spenders over three windows, plus every customer's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopClientsReport {
    pub last_two_months_range: DateRange,
    pub previous_year_range: DateRange,
    /// Ranked by spend in the last two months
    pub last_two_months: Vec<RankedCustomer>,
    /// Ranked by spend in the previous calendar year
    pub previous_year: Vec<RankedCustomer>,
    /// Ranked by lifetime spend
    pub all_time: Vec<RankedCustomer>,
    /// Every customer in first-occurrence order
    pub customers: Vec<CustomerSummary>,
}

impl TopClientsReport {
    /// Aggregate `orders` once and rank the top `top_n` customers for each
    /// window. Bounded windows only list customers with an order inside them.
    ///
    /// # Errors
    ///
    /// Returns error if `now` is too close to the limits of the calendar for
    /// the windows to be built.
    pub fn build(orders: &[Order], now: DateTime<Utc>, top_n: usize) -> Result<Self, DateRangeError> {
        let last_two_months_range = DateRange::last_months(now, 2)?;
        let previous_year_range = DateRange::previous_calendar_year(now)?;
        let windows = [
            Window::Range(last_two_months_range),
            Window::Range(previous_year_range),
            Window::AllTime,
        ];

        let groups = aggregate(orders, &CustomerSpend, &windows);

        Ok(Self {
            last_two_months_range,
            previous_year_range,
            last_two_months: ranked(&groups, LAST_TWO_MONTHS, top_n),
            previous_year: ranked(&groups, PREVIOUS_YEAR, top_n),
            all_time: rank(&groups, RankBy::Lifetime, top_n)
                .into_iter()
                .map(|group| RankedCustomer {
                    key: group.key.clone(),
                    name: group.display_name.clone(),
                    total: group.lifetime_total,
                    order_count: group.occurrence_count,
                })
                .collect(),
            customers: groups.iter().map(summarize).collect(),
        })
    }
}

fn ranked(groups: &[AggregateGroup<'_, Order>], window: usize, top_n: usize) -> Vec<RankedCustomer> {
    let active = groups
        .iter()
        .filter(|group| group.windowed_count(window) > 0);

    rank(active, RankBy::Window(window), top_n)
        .into_iter()
        .map(|group| RankedCustomer {
            key: group.key.clone(),
            name: group.display_name.clone(),
            total: group.windowed_total(window),
            order_count: group.windowed_count(window),
        })
        .collect()
}

fn summarize(group: &AggregateGroup<'_, Order>) -> CustomerSummary {
    CustomerSummary {
        key: group.key.clone(),
        name: group.display_name.clone(),
        email: group
            .members
            .first()
            .map(|order| order.billing.email.trim().to_string())
            .unwrap_or_default(),
        lifetime_total: group.lifetime_total,
        order_count: group.occurrence_count,
        last_two_months_total: group.windowed_total(LAST_TWO_MONTHS),
        previous_year_total: group.windowed_total(PREVIOUS_YEAR),
        last_order_at: group.members.iter().filter_map(|o| o.created_at()).max(),
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// Review count, average rating and newest review for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub count: usize,
    /// Mean rating rounded to one decimal; `None` with no reviews
    pub average_rating: Option<Decimal>,
    pub newest: Option<Review>,
}

impl ReviewSummary {
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        Self {
            count: reviews.len(),
            average_rating: average_rating(reviews.iter().map(|r| r.rating)),
            newest: reviews
                .iter()
                .filter(|r| r.created_at().is_some())
                .max_by_key(|r| r.created_at())
                .or_else(|| reviews.first())
                .cloned(),
        }
    }
}

fn average_rating(ratings: impl Iterator<Item = u8>) -> Option<Decimal> {
    let (sum, count) = ratings.fold((0u64, 0u64), |(sum, count), rating| {
        (sum + u64::from(rating), count + 1)
    });
    if count == 0 {
        return None;
    }
    let mean = Decimal::from(sum) / Decimal::from(count);
    Some(mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Groups reviews by product. The amount is the star rating.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductRatings;

impl Rollup<Review> for ProductRatings {
    fn key_of(&self, review: &Review) -> String {
        format!("product:{}", review.product_id)
    }

    fn display_name_of(&self, review: &Review) -> String {
        if review.product_name.trim().is_empty() {
            format!("Product #{}", review.product_id)
        } else {
            review.product_name.trim().to_string()
        }
    }

    fn amount_of(&self, review: &Review) -> Option<Decimal> {
        Some(Decimal::from(review.rating))
    }

    fn date_of(&self, review: &Review) -> Option<DateTime<Utc>> {
        review.created_at()
    }
}

/// A product's rating across its reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedProduct {
    pub product_id: ProductId,
    pub name: String,
    pub average_rating: Decimal,
    pub review_count: usize,
}

/// The `top_n` products by average rating, ties broken by review count and
/// then by first appearance.
#[must_use]
pub fn top_rated_products(reviews: &[Review], top_n: usize) -> Vec<RatedProduct> {
    let mut rated: Vec<RatedProduct> = aggregate(reviews, &ProductRatings, &[])
        .into_iter()
        .filter_map(|group| {
            let first = group.members.first()?;
            Some(RatedProduct {
                product_id: first.product_id,
                name: group.display_name,
                average_rating: average_rating(group.members.iter().map(|r| r.rating))?,
                review_count: group.occurrence_count,
            })
        })
        .collect();

    rated.sort_by(|a, b| {
        b.average_rating
            .cmp(&a.average_rating)
            .then_with(|| b.review_count.cmp(&a.review_count))
    });
    rated.truncate(top_n);
    rated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn order(id: u64, customer: u64, email: &str, name: (&str, &str), total: &str, date: &str) -> Order {
        serde_json::from_value(json!({
            "id": id,
            "customer_id": customer,
            "total": total,
            "date_created_gmt": date,
            "billing": {"first_name": name.0, "last_name": name.1, "email": email},
        }))
        .unwrap()
    }

    fn review(id: u64, product: u64, rating: u8, date: &str) -> Review {
        serde_json::from_value(json!({
            "id": id,
            "product_id": product,
            "product_name": format!("Product {product}"),
            "rating": rating,
            "date_created_gmt": date,
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_customer_keys() {
        let registered = order(1, 7, "A@Example.com", ("Ann", "Lee"), "10", "2024-05-01T00:00:00");
        let guest = order(2, 0, " Bob@Example.com ", ("", ""), "10", "2024-05-01T00:00:00");
        let anonymous = order(3, 0, "", ("", ""), "10", "2024-05-01T00:00:00");

        assert_eq!(CustomerSpend.key_of(&registered), "customer:7");
        assert_eq!(CustomerSpend.key_of(&guest), "email:bob@example.com");
        assert_eq!(CustomerSpend.key_of(&anonymous), "order:3");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let named = order(1, 7, "a@example.com", ("Ann", "Lee"), "10", "2024-05-01T00:00:00");
        let emailed = order(2, 0, "bob@example.com", ("", ""), "10", "2024-05-01T00:00:00");
        let anonymous = order(3, 0, "", ("", ""), "10", "2024-05-01T00:00:00");

        assert_eq!(CustomerSpend.display_name_of(&named), "Ann Lee");
        assert_eq!(CustomerSpend.display_name_of(&emailed), "bob@example.com");
        assert_eq!(CustomerSpend.display_name_of(&anonymous), "Guest");
    }

    #[test]
    fn test_guest_orders_with_same_email_merge() {
        let orders = [
            order(1, 0, "sam@example.com", ("Sam", "Ray"), "10.00", "2024-05-01T00:00:00"),
            order(2, 0, "SAM@example.com", ("Sam", "Ray"), "15.50", "2024-05-02T00:00:00"),
        ];
        let report = TopClientsReport::build(&orders, now(), 10).unwrap();

        assert_eq!(report.customers.len(), 1);
        assert_eq!(report.customers[0].lifetime_total, Decimal::new(2550, 2));
        assert_eq!(report.customers[0].order_count, 2);
    }

    #[test]
    fn test_top_clients_windows() {
        let orders = [
            // Ann: big spender last year, nothing recent
            order(1, 1, "ann@example.com", ("Ann", "Lee"), "500.00", "2023-06-01T10:00:00"),
            // Bob: recent only
            order(2, 2, "bob@example.com", ("Bob", "Ng"), "80.00", "2024-04-20T10:00:00"),
            order(3, 2, "bob@example.com", ("Bob", "Ng"), "20.00", "2024-05-10T10:00:00"),
            // Cy: a bit of both, plus an old order two years back
            order(4, 3, "cy@example.com", ("Cy", "Ho"), "40.00", "2023-12-31T23:59:59"),
            order(5, 3, "cy@example.com", ("Cy", "Ho"), "60.00", "2024-04-01T00:00:00"),
            order(6, 3, "cy@example.com", ("Cy", "Ho"), "900.00", "2022-01-01T00:00:00"),
        ];

        let report = TopClientsReport::build(&orders, now(), 10).unwrap();

        let names = |ranking: &[RankedCustomer]| {
            ranking
                .iter()
                .map(|c| (c.name.clone(), c.total))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(&report.last_two_months),
            vec![
                ("Bob Ng".to_string(), Decimal::new(10000, 2)),
                ("Cy Ho".to_string(), Decimal::new(6000, 2)),
            ]
        );
        assert_eq!(
            names(&report.previous_year),
            vec![
                ("Ann Lee".to_string(), Decimal::new(50000, 2)),
                ("Cy Ho".to_string(), Decimal::new(4000, 2)),
            ]
        );
        assert_eq!(
            names(&report.all_time),
            vec![
                ("Cy Ho".to_string(), Decimal::new(100_000, 2)),
                ("Ann Lee".to_string(), Decimal::new(50000, 2)),
                ("Bob Ng".to_string(), Decimal::new(10000, 2)),
            ]
        );
        assert_eq!(report.all_time[0].order_count, 3);
        assert_eq!(report.last_two_months[1].order_count, 1);
    }

    #[test]
    fn test_customer_summaries_in_first_occurrence_order() {
        let orders = [
            order(1, 2, "bob@example.com", ("Bob", "Ng"), "1", "2024-05-01T00:00:00"),
            order(2, 1, "ann@example.com", ("Ann", "Lee"), "1", "2024-05-02T00:00:00"),
            order(3, 2, "bob@example.com", ("Bob", "Ng"), "1", "2024-05-03T00:00:00"),
        ];
        let report = TopClientsReport::build(&orders, now(), 10).unwrap();

        let keys: Vec<&str> = report.customers.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["customer:2", "customer:1"]);
        assert_eq!(
            report.customers[0].last_order_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_top_n_truncates_each_ranking() {
        let orders: Vec<Order> = (1..=15)
            .map(|i| order(i, i, "", ("C", &i.to_string()), &format!("{i}.00"), "2024-05-01T00:00:00"))
            .collect();
        let report = TopClientsReport::build(&orders, now(), 10).unwrap();

        assert_eq!(report.all_time.len(), 10);
        assert_eq!(report.last_two_months.len(), 10);
        assert!(report.previous_year.is_empty());
        assert_eq!(report.all_time[0].total, Decimal::new(1500, 2));
    }

    #[test]
    fn test_review_summary() {
        let reviews = [
            review(1, 22, 5, "2024-01-01T00:00:00"),
            review(2, 22, 4, "2024-03-01T00:00:00"),
            review(3, 22, 4, "2024-02-01T00:00:00"),
        ];
        let summary = ReviewSummary::from_reviews(&reviews);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.average_rating, Some(Decimal::new(43, 1)));
        assert_eq!(summary.newest.unwrap().id.as_u64(), 2);
    }

    #[test]
    fn test_review_summary_empty() {
        let summary = ReviewSummary::from_reviews(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, None);
        assert!(summary.newest.is_none());
    }

    #[test]
    fn test_top_rated_products() {
        let reviews = [
            review(1, 10, 3, "2024-01-01T00:00:00"),
            review(2, 20, 5, "2024-01-01T00:00:00"),
            review(3, 10, 4, "2024-01-01T00:00:00"),
            review(4, 30, 5, "2024-01-01T00:00:00"),
            review(5, 30, 5, "2024-01-01T00:00:00"),
        ];

        let top = top_rated_products(&reviews, 2);

        let ids: Vec<u64> = top.iter().map(|p| p.product_id.as_u64()).collect();
        assert_eq!(ids, vec![30, 20]);
        assert_eq!(top[0].review_count, 2);
        assert_eq!(top[0].name, "Product 30");
    }
}
