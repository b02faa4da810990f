//! Full-collection fetch: walk a resource page by page until it runs dry.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::woocommerce::{MAX_PER_PAGE, PageRequest, Transport, WooClient};

impl<T: Transport> WooClient<T> {
    /// Fetch every item of `resource` by requesting pages 1, 2, 3, ...
    /// (100 per page) one at a time until a page comes back empty.
    ///
    /// Items are returned in page order. `X-WP-Total` is never consulted:
    /// the empty page is the only terminator.
    ///
    /// All or nothing: the first failing page aborts the fetch and items
    /// gathered from earlier pages are dropped.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    /// Returns [`StoreError::CollectionTooLarge`] if more than
    /// `max_pages` non-empty pages are served.
    #[instrument(skip(self, extra_params))]
    pub async fn fetch_all<I: DeserializeOwned>(
        &self,
        resource: &str,
        extra_params: &BTreeMap<String, String>,
    ) -> Result<Vec<I>, StoreError> {
        let max_pages = self.limits().max_pages;
        let mut items: Vec<I> = Vec::new();
        let mut page = 1u32;

        loop {
            let request = PageRequest::new(resource, page, MAX_PER_PAGE).with_params(extra_params);
            let batch = self.fetch_page::<I>(&request).await?;

            if batch.items.is_empty() {
                break;
            }

            if page > max_pages {
                return Err(StoreError::CollectionTooLarge {
                    resource: resource.to_owned(),
                    max_pages,
                });
            }

            debug!(page, items = batch.items.len(), "Collected page");
            items.extend(batch.items);
            page += 1;
        }

        info!(
            resource = %resource,
            items = items.len(),
            pages = page - 1,
            "Fetched full collection"
        );

        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::config::FetchLimits;
    use crate::testing::{self, StubTransport};
    use crate::woocommerce::types::Coupon;

    use super::*;

    fn coupon(id: u64) -> serde_json::Value {
        json!({"id": id, "code": format!("C{id}"), "amount": "5.00"})
    }

    #[tokio::test]
    async fn test_concatenates_until_empty_page() {
        let stub = StubTransport::new().with_pages(
            "coupons",
            vec![
                json!([coupon(1), coupon(2)]),
                json!([coupon(3)]),
                json!([]),
                json!([coupon(99)]),
            ],
        );
        let client = testing::client(stub);

        let coupons: Vec<Coupon> = client.fetch_all("coupons", &BTreeMap::new()).await.unwrap();

        let ids: Vec<u64> = coupons.iter().map(|c| c.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(client.transport().pages_requested("coupons"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_collection_is_one_request() {
        let client = testing::client(StubTransport::new().with_pages("coupons", vec![]));

        let coupons: Vec<Coupon> = client.fetch_all("coupons", &BTreeMap::new()).await.unwrap();

        assert!(coupons.is_empty());
        assert_eq!(client.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_ignores_total_count_header() {
        let stub = StubTransport::new()
            .with_pages("coupons", vec![json!([coupon(1)]), json!([coupon(2)])])
            .with_total_count("coupons", 1);
        let client = testing::client(stub);

        let coupons: Vec<Coupon> = client.fetch_all("coupons", &BTreeMap::new()).await.unwrap();
        assert_eq!(coupons.len(), 2);
    }

    #[tokio::test]
    async fn test_requests_full_pages_with_extra_params() {
        let stub = StubTransport::new().with_pages("products/reviews", vec![]);
        let client = testing::client(stub);
        let params = BTreeMap::from([("product".to_string(), "22".to_string())]);

        let _: Vec<serde_json::Value> = client.fetch_all("products/reviews", &params).await.unwrap();

        let url = client.transport().requests().pop().unwrap();
        let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["per_page"], "100");
        assert_eq!(query["product"], "22");
    }

    #[tokio::test]
    async fn test_failing_page_discards_everything() {
        let stub = StubTransport::new()
            .with_pages(
                "coupons",
                vec![json!([coupon(1)]), json!([coupon(2)]), json!([coupon(3)])],
            )
            .with_failing_page("coupons", 2);
        let client = testing::client(stub);

        let result = client.fetch_all::<Coupon>("coupons", &BTreeMap::new()).await;

        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert_eq!(client.transport().pages_requested("coupons"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_endless_collection_hits_ceiling() {
        let stub = StubTransport::new().with_endless_page("coupons", json!([coupon(1)]));
        let limits = FetchLimits {
            max_pages: 3,
            ..FetchLimits::default()
        };
        let client = WooClient::with_transport(stub, Some(testing::credentials()), limits);

        let result = client.fetch_all::<Coupon>("coupons", &BTreeMap::new()).await;

        match result {
            Err(StoreError::CollectionTooLarge { resource, max_pages }) => {
                assert_eq!(resource, "coupons");
                assert_eq!(max_pages, 3);
            }
            other => panic!("expected CollectionTooLarge, got {other:?}"),
        }
        assert_eq!(client.transport().call_count(), 4);
    }

    #[tokio::test]
    async fn test_exactly_max_pages_succeeds() {
        let stub = StubTransport::new()
            .with_pages("coupons", vec![json!([coupon(1)]), json!([coupon(2)])]);
        let limits = FetchLimits {
            max_pages: 2,
            ..FetchLimits::default()
        };
        let client = WooClient::with_transport(stub, Some(testing::credentials()), limits);

        let coupons: Vec<Coupon> = client.fetch_all("coupons", &BTreeMap::new()).await.unwrap();
        assert_eq!(coupons.len(), 2);
    }
}
