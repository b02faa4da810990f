//! Storefront read operations: shop grid, product pages, reviews, order
//! history.

use std::collections::{BTreeMap, HashMap, HashSet};

use futures::future::try_join_all;
use tracing::{debug, instrument};
use woo_storefront_core::ProductId;

use crate::error::StoreError;
use crate::pagination::PaginatedView;
use crate::woocommerce::types::{Category, Order, Product, Review, Variation};
use crate::woocommerce::{PageRequest, Transport, WooClient};

/// A product with its variations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub product: Product,
    /// In the order the product lists them
    pub variations: Vec<Variation>,
}

/// A review alongside the product it was written for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewedProduct {
    pub review: Review,
    /// `None` when the product has since been deleted
    pub product: Option<Product>,
}

impl<T: Transport> WooClient<T> {
    /// Every order, newest first. Orders without a date sort last; equal
    /// dates keep server order.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::fetch_all`].
    #[instrument(skip(self))]
    pub async fn order_history(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.fetch_all("orders", &BTreeMap::new()).await?;
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }

    /// A product and all of its variations, fetched concurrently.
    ///
    /// # Errors
    ///
    /// Fails if the product or any one variation cannot be fetched.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, StoreError> {
        let product = self.product(id).await?;

        let paths: Vec<String> = product
            .variations
            .iter()
            .map(|variation| format!("products/{id}/variations/{variation}"))
            .collect();
        let variations: Vec<Variation> =
            try_join_all(paths.iter().map(|path| self.fetch_record::<Variation>(path))).await?;

        debug!(variations = variations.len(), "Loaded product detail");
        Ok(ProductDetail {
            product,
            variations,
        })
    }

    /// Every review of `product_id`, de-duplicated by review ID.
    ///
    /// The `product` filter is sent to the API, and results are filtered
    /// again locally in case the store ignores it.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::fetch_all`].
    #[instrument(skip(self))]
    pub async fn product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, StoreError> {
        let params = BTreeMap::from([("product".to_string(), product_id.to_string())]);
        let reviews: Vec<Review> = self.fetch_all("products/reviews", &params).await?;

        let mut seen = HashSet::new();
        Ok(reviews
            .into_iter()
            .filter(|review| review.product_id == product_id)
            .filter(|review| seen.insert(review.id))
            .collect())
    }

    /// The newest `limit` reviews across the store, each with its product.
    ///
    /// Products go through the product cache, and each distinct product is
    /// fetched once no matter how many reviews mention it.
    ///
    /// # Errors
    ///
    /// Fails if the review page or any product lookup fails. A product that
    /// answers 404 is reported as `None` instead.
    #[instrument(skip(self))]
    pub async fn latest_reviews(&self, limit: u32) -> Result<Vec<ReviewedProduct>, StoreError> {
        let request = PageRequest::new("products/reviews", 1, limit)
            .with_param("orderby", "date_gmt")
            .with_param("order", "desc");
        let reviews = self.fetch_page::<Review>(&request).await?.items;

        let mut seen = HashSet::new();
        let product_ids: Vec<ProductId> = reviews
            .iter()
            .map(|review| review.product_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let products =
            try_join_all(product_ids.iter().map(|id| self.product_if_exists(*id))).await?;
        let products: HashMap<ProductId, Product> = product_ids
            .into_iter()
            .zip(products)
            .filter_map(|(id, product)| product.map(|product| (id, product)))
            .collect();

        debug!(reviews = reviews.len(), products = products.len(), "Loaded latest reviews");
        Ok(reviews
            .into_iter()
            .map(|review| ReviewedProduct {
                product: products.get(&review.product_id).cloned(),
                review,
            })
            .collect())
    }

    async fn product_if_exists(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        match self.product(id).await {
            Ok(product) => Ok(Some(product)),
            Err(StoreError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every product category. Cached for five minutes.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::fetch_all`].
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        if let Some(categories) = self.cached_categories().await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> =
            self.fetch_all("products/categories", &BTreeMap::new()).await?;
        self.store_categories(categories.clone()).await;
        Ok(categories)
    }

    /// The first `limit` products, for the landing page.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::fetch_page`].
    #[instrument(skip(self))]
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, StoreError> {
        let page = self
            .fetch_page::<Product>(&PageRequest::new("products", 1, limit))
            .await?;
        Ok(page.items)
    }

    /// A server-paginated view of the shop grid.
    #[must_use]
    pub fn product_listing(&self, per_page: u32) -> PaginatedView<Product, T> {
        PaginatedView::new(self.clone(), "products", per_page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use woo_storefront_core::ReviewId;

    use crate::testing::{self, StubTransport};

    use super::*;

    #[tokio::test]
    async fn test_order_history_newest_first() {
        let stub = StubTransport::new().with_pages(
            "orders",
            vec![json!([
                {"id": 1, "customer_id": 0, "total": "1", "date_created_gmt": "2024-01-01T00:00:00"},
                {"id": 2, "customer_id": 0, "total": "1"},
                {"id": 3, "customer_id": 0, "total": "1", "date_created_gmt": "2024-03-01T00:00:00"},
                {"id": 4, "customer_id": 0, "total": "1", "date_created_gmt": "2024-01-01T00:00:00"},
            ])],
        );
        let client = testing::client(stub);

        let ids: Vec<u64> = client
            .order_history()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id.as_u64())
            .collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[tokio::test]
    async fn test_product_detail_fans_out_variations() {
        let stub = StubTransport::new()
            .with_record("products/22", json!({"id": 22, "name": "Hoodie", "variations": [23, 24]}))
            .with_record(
                "products/22/variations/23",
                json!({"id": 23, "price": "45", "attributes": [{"name": "Size", "option": "M"}]}),
            )
            .with_record(
                "products/22/variations/24",
                json!({"id": 24, "price": "45", "attributes": [{"name": "Size", "option": "L"}]}),
            );
        let client = testing::client(stub);

        let detail = client.product_detail(ProductId::new(22)).await.unwrap();

        assert_eq!(detail.product.name, "Hoodie");
        let labels: Vec<String> = detail.variations.iter().map(Variation::label).collect();
        assert_eq!(labels, vec!["Size: M", "Size: L"]);
        assert_eq!(client.transport().call_count(), 3);
    }

    #[tokio::test]
    async fn test_product_detail_fails_as_batch() {
        let stub = StubTransport::new()
            .with_record("products/22", json!({"id": 22, "name": "Hoodie", "variations": [23, 24]}))
            .with_record("products/22/variations/23", json!({"id": 23, "price": "45"}))
            .with_status(
                "products/22/variations/24",
                404,
                r#"{"code":"woocommerce_rest_invalid_id","message":"Invalid ID."}"#,
            );
        let client = testing::client(stub);

        let result = client.product_detail(ProductId::new(22)).await;
        assert!(matches!(result, Err(StoreError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_product_reviews_filters_and_dedupes() {
        let stub = StubTransport::new().with_pages(
            "products/reviews",
            vec![
                json!([
                    {"id": 1, "product_id": 22, "rating": 5},
                    {"id": 2, "product_id": 99, "rating": 1},
                ]),
                json!([
                    {"id": 1, "product_id": 22, "rating": 5},
                    {"id": 3, "product_id": 22, "rating": 4},
                ]),
            ],
        );
        let client = testing::client(stub);

        let reviews = client.product_reviews(ProductId::new(22)).await.unwrap();

        let ids: Vec<ReviewId> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ReviewId::new(1), ReviewId::new(3)]);
    }

    #[tokio::test]
    async fn test_latest_reviews_fetch_each_product_once() {
        let stub = StubTransport::new()
            .with_pages(
                "products/reviews",
                vec![json!([
                    {"id": 1, "product_id": 22, "rating": 5},
                    {"id": 2, "product_id": 22, "rating": 4},
                    {"id": 3, "product_id": 22, "rating": 3},
                ])],
            )
            .with_record("products/22", json!({"id": 22, "name": "Hoodie"}));
        let client = testing::client(stub);

        let latest = client.latest_reviews(10).await.unwrap();

        assert_eq!(latest.len(), 3);
        assert!(
            latest
                .iter()
                .all(|entry| entry.product.as_ref().unwrap().name == "Hoodie")
        );
        let product_requests = client
            .transport()
            .requests()
            .iter()
            .filter(|url| url.path().ends_with("/products/22"))
            .count();
        assert_eq!(product_requests, 1);
        assert_eq!(client.transport().pages_requested("products/reviews"), vec![1]);
    }

    #[tokio::test]
    async fn test_latest_reviews_repeat_call_uses_product_cache() {
        let stub = StubTransport::new()
            .with_pages(
                "products/reviews",
                vec![json!([{"id": 1, "product_id": 22, "rating": 5}])],
            )
            .with_record("products/22", json!({"id": 22, "name": "Hoodie"}));
        let client = testing::client(stub);

        client.latest_reviews(10).await.unwrap();
        client.latest_reviews(10).await.unwrap();

        // Two review pages, one product lookup
        assert_eq!(client.transport().call_count(), 3);
    }

    #[tokio::test]
    async fn test_latest_reviews_deleted_product_is_none() {
        let stub = StubTransport::new()
            .with_pages(
                "products/reviews",
                vec![json!([
                    {"id": 1, "product_id": 22, "rating": 5},
                    {"id": 2, "product_id": 40, "rating": 2},
                ])],
            )
            .with_record("products/22", json!({"id": 22, "name": "Hoodie"}));
        let client = testing::client(stub);

        let latest = client.latest_reviews(10).await.unwrap();

        assert!(latest[0].product.is_some());
        assert_eq!(latest[1].review.id, ReviewId::new(2));
        assert!(latest[1].product.is_none());
    }

    #[tokio::test]
    async fn test_categories_are_cached() {
        let stub = StubTransport::new().with_pages(
            "products/categories",
            vec![json!([{"id": 15, "name": "Hoodies", "slug": "hoodies"}])],
        );
        let client = testing::client(stub);

        let first = client.categories().await.unwrap();
        let second = client.categories().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].name, "Hoodies");
        // One page plus the empty terminator
        assert_eq!(client.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_featured_products_single_page() {
        let stub = StubTransport::new().with_items(
            "products",
            &(1..=6).map(|id| json!({"id": id, "name": "P"})).collect::<Vec<_>>(),
            4,
        );
        let client = testing::client(stub);

        let featured = client.featured_products(4).await.unwrap();

        assert_eq!(featured.len(), 4);
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_product_listing_pages() {
        let stub = StubTransport::new()
            .with_items(
                "products",
                &(1..=12).map(|id| json!({"id": id, "name": "P"})).collect::<Vec<_>>(),
                9,
            )
            .with_total_count("products", 12);
        let listing = testing::client(stub).product_listing(9);

        let second = listing.fetch_page(2).await.unwrap().into_current().unwrap();

        assert_eq!(second.items.len(), 3);
        assert_eq!(second.total_pages, 2);
    }
}
