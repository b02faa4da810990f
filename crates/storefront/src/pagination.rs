//! Page-at-a-time views over a remote collection.
//!
//! [`PaginatedView`] asks the server for one page at a time and relies on
//! `X-WP-Total` to know how many pages exist. When requests overlap, only
//! the most recently issued one may update the view: every request takes a
//! generation ticket, and a response whose ticket is no longer current is
//! dropped as [`PageOutcome::Superseded`].
//!
//! [`local_page`] slices a collection that was already fetched in full.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::woocommerce::{HttpTransport, MAX_PER_PAGE, PageRequest, Transport, WooClient};

// =============================================================================
// Server-Paginated View
// =============================================================================

/// One page as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<I> {
    pub items: Vec<I>,
    /// 1-based page number that was fetched
    pub current_page: u32,
    /// `ceil(total_count / per_page)`; 0 for an empty collection
    pub total_pages: u32,
}

/// Result of loading a page ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<I> {
    /// The page was applied and is now the current view.
    Current(PageView<I>),
    /// A newer request was issued while this one was in flight.
    Superseded,
}

impl<I> PageOutcome<I> {
    /// The applied page, if this outcome was not superseded.
    #[must_use]
    pub fn into_current(self) -> Option<PageView<I>> {
        match self {
            Self::Current(view) => Some(view),
            Self::Superseded => None,
        }
    }
}

/// Claim on the view issued by [`PaginatedView::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    page: u32,
}

impl PageTicket {
    /// Page this ticket will fetch (after clamping).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }
}

struct ViewState<I> {
    total_pages: Option<u32>,
    current: Option<PageView<I>>,
}

/// Server-paginated view over one resource.
pub struct PaginatedView<I, T = HttpTransport> {
    client: WooClient<T>,
    resource: String,
    per_page: u32,
    params: BTreeMap<String, String>,
    generation: AtomicU64,
    state: Mutex<ViewState<I>>,
}

impl<I, T> std::fmt::Debug for PaginatedView<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedView")
            .field("resource", &self.resource)
            .field("per_page", &self.per_page)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<I, T> PaginatedView<I, T>
where
    I: DeserializeOwned + Clone + Send,
    T: Transport,
{
    /// A view of `resource` with `per_page` items per page (clamped to `1..=100`).
    #[must_use]
    pub fn new(client: WooClient<T>, resource: impl Into<String>, per_page: u32) -> Self {
        Self {
            client,
            resource: resource.into(),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            params: BTreeMap::new(),
            generation: AtomicU64::new(0),
            state: Mutex::new(ViewState {
                total_pages: None,
                current: None,
            }),
        }
    }

    /// Add a filter sent with every page request.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// The last applied page.
    pub async fn current(&self) -> Option<PageView<I>> {
        self.state.lock().await.current.clone()
    }

    /// Page count from the last applied response, if any.
    pub async fn total_pages(&self) -> Option<u32> {
        self.state.lock().await.total_pages
    }

    /// Issue a ticket for `page`, clamped to the known page range.
    ///
    /// Issuing a ticket supersedes every ticket issued before it.
    pub async fn request(&self, page: u32) -> PageTicket {
        let known = self.state.lock().await.total_pages;
        let page = clamp_page(page, known);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        PageTicket { generation, page }
    }

    /// Fetch the ticket's page and apply it unless a newer ticket exists.
    ///
    /// A ticket issued before the page count was known may point past the
    /// last page. The response reveals the real count, so the last page is
    /// fetched under a new ticket and applied instead.
    ///
    /// # Errors
    ///
    /// - Any [`WooClient::fetch_page`] error, if the ticket is still current
    /// - `PaginationUnsupported` if the response has no `X-WP-Total`
    ///
    /// Errors from superseded requests are discarded.
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn load(&self, ticket: PageTicket) -> Result<PageOutcome<I>, StoreError> {
        let mut ticket = ticket;
        loop {
            let request = PageRequest::new(self.resource.as_str(), ticket.page, self.per_page)
                .with_params(&self.params);
            let result = self.client.fetch_page::<I>(&request).await;

            let mut state = self.state.lock().await;
            if self.generation.load(Ordering::SeqCst) != ticket.generation {
                debug!(page = ticket.page, "Discarding superseded page");
                return Ok(PageOutcome::Superseded);
            }

            let page = result?;
            let total_count = page
                .total_count
                .ok_or_else(|| StoreError::PaginationUnsupported(self.resource.clone()))?;
            let total_pages = page_count(total_count, self.per_page);
            state.total_pages = Some(total_pages);

            let last = total_pages.max(1);
            if ticket.page > last {
                debug!(requested = ticket.page, last, "Page past the end, fetching last page");
                ticket = PageTicket {
                    generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
                    page: last,
                };
                continue;
            }

            let view = PageView {
                items: page.items,
                current_page: ticket.page,
                total_pages,
            };
            state.current = Some(view.clone());

            return Ok(PageOutcome::Current(view));
        }
    }

    /// Fetch page `page`, clamped to `[1, total_pages]` once the response
    /// reports the page count.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub async fn fetch_page(&self, page: u32) -> Result<PageOutcome<I>, StoreError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.load(PageTicket {
            generation,
            page: page.max(1),
        })
        .await
    }

    /// Move to `page`, clamped to `[1, total_pages]`, and fetch it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub async fn go_to_page(&self, page: u32) -> Result<PageOutcome<I>, StoreError> {
        let ticket = self.request(page).await;
        self.load(ticket).await
    }
}

fn page_count(total_count: u64, per_page: u32) -> u32 {
    u32::try_from(total_count.div_ceil(u64::from(per_page.max(1)))).unwrap_or(u32::MAX)
}

fn clamp_page(page: u32, total_pages: Option<u32>) -> u32 {
    match total_pages {
        Some(total) => page.clamp(1, total.max(1)),
        None => page.max(1),
    }
}

// =============================================================================
// Local Pager
// =============================================================================

/// A page sliced out of an in-memory collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPage<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

/// Slice page `page` out of `items`. `page` is clamped to
/// `[1, max(total_pages, 1)]`.
#[must_use]
pub fn local_page<T>(items: &[T], page: usize, per_page: usize) -> LocalPage<'_, T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let current_page = page.clamp(1, total_pages.max(1));
    let start = ((current_page - 1) * per_page).min(items.len());
    let end = (start + per_page).min(items.len());

    LocalPage {
        items: items.get(start..end).unwrap_or_default(),
        current_page,
        total_pages,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};

    use crate::testing::{self, StubTransport};

    use super::*;

    fn products(ids: std::ops::RangeInclusive<u64>) -> Value {
        Value::Array(ids.map(|id| json!({"id": id, "name": format!("P{id}")})).collect())
    }

    fn view(stub: StubTransport, per_page: u32) -> PaginatedView<Value, StubTransport> {
        PaginatedView::new(testing::client(stub), "products", per_page)
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(95, 20), 5);
        assert_eq!(page_count(100, 20), 5);
        assert_eq!(page_count(0, 9), 0);
        assert_eq!(page_count(1, 9), 1);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(7, Some(5)), 5);
        assert_eq!(clamp_page(0, Some(5)), 1);
        assert_eq!(clamp_page(3, Some(0)), 1);
        assert_eq!(clamp_page(7, None), 7);
        assert_eq!(clamp_page(0, None), 1);
    }

    #[tokio::test]
    async fn test_total_pages_from_total_count() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=20)])
            .with_total_count("products", 95);
        let view = view(stub, 20);

        let page = view.fetch_page(1).await.unwrap().into_current().unwrap();

        assert_eq!(page.items.len(), 20);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 5);
    }

    #[tokio::test]
    async fn test_go_to_page_clamps_to_last_page() {
        let stub = StubTransport::new()
            .with_pages(
                "products",
                vec![
                    products(1..=20),
                    products(21..=40),
                    products(41..=60),
                    products(61..=80),
                    products(81..=95),
                ],
            )
            .with_total_count("products", 95);
        let view = view(stub, 20);

        view.fetch_page(1).await.unwrap();
        let page = view.go_to_page(7).await.unwrap().into_current().unwrap();

        assert_eq!(page.current_page, 5);
        assert_eq!(page.items.len(), 15);
        assert_eq!(view.client.transport().pages_requested("products"), vec![1, 5]);
    }

    #[tokio::test]
    async fn test_page_past_end_before_count_known_refetches_last_page() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=9), products(10..=12)])
            .with_total_count("products", 12);
        let view = view(stub, 9);

        let page = view.go_to_page(99).await.unwrap().into_current().unwrap();

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 3);
        assert_eq!(view.client.transport().pages_requested("products"), vec![99, 2]);
    }

    #[tokio::test]
    async fn test_fresh_view_past_end_of_empty_collection() {
        let stub = StubTransport::new()
            .with_pages("products", vec![])
            .with_total_count("products", 0);
        let view = view(stub, 9);

        let page = view.go_to_page(3).await.unwrap().into_current().unwrap();

        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_missing_total_count_is_unsupported() {
        let stub = StubTransport::new().with_pages("products", vec![products(1..=3)]);
        let view = view(stub, 9);

        let result = view.fetch_page(1).await;

        assert!(matches!(result, Err(StoreError::PaginationUnsupported(ref r)) if r == "products"));
        assert!(view.current().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_collection_clamps_to_first_page() {
        let stub = StubTransport::new()
            .with_pages("products", vec![])
            .with_total_count("products", 0);
        let view = view(stub, 9);

        let first = view.fetch_page(1).await.unwrap().into_current().unwrap();
        assert_eq!(first.total_pages, 0);
        assert!(first.items.is_empty());

        let again = view.go_to_page(4).await.unwrap().into_current().unwrap();
        assert_eq!(again.current_page, 1);
    }

    #[tokio::test]
    async fn test_each_view_refetches() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=9)])
            .with_total_count("products", 9);
        let view = view(stub, 9);

        view.fetch_page(1).await.unwrap();
        view.fetch_page(1).await.unwrap();

        assert_eq!(view.client.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=9), products(10..=18)])
            .with_total_count("products", 18)
            .with_delay("products", 1, Duration::from_millis(50));
        let view = view(stub, 9);

        let slow = view.request(1).await;
        let fast = view.request(2).await;
        let (slow, fast) = tokio::join!(view.load(slow), view.load(fast));

        assert_eq!(slow.unwrap(), PageOutcome::Superseded);
        let fast = fast.unwrap().into_current().unwrap();
        assert_eq!(fast.current_page, 2);
        assert_eq!(view.current().await.unwrap().current_page, 2);
    }

    #[tokio::test]
    async fn test_stale_error_is_discarded() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=9), products(10..=18)])
            .with_total_count("products", 18)
            .with_failing_page("products", 1)
            .with_delay("products", 1, Duration::from_millis(50));
        let view = view(stub, 9);

        let failing = view.request(1).await;
        let latest = view.request(2).await;
        let (failing, latest) = tokio::join!(view.load(failing), view.load(latest));

        assert_eq!(failing.unwrap(), PageOutcome::Superseded);
        assert!(latest.unwrap().into_current().is_some());
    }

    #[tokio::test]
    async fn test_earlier_ticket_finishing_first_is_still_superseded() {
        let stub = StubTransport::new()
            .with_pages("products", vec![products(1..=9), products(10..=18)])
            .with_total_count("products", 18);
        let view = view(stub, 9);

        let older = view.request(1).await;
        let newer = view.request(2).await;

        assert_eq!(view.load(older).await.unwrap(), PageOutcome::Superseded);
        assert!(view.current().await.is_none());
        assert!(view.load(newer).await.unwrap().into_current().is_some());
    }

    #[test]
    fn test_local_page_slices() {
        let items: Vec<u32> = (1..=45).collect();

        let page = local_page(&items, 3, 20);
        assert_eq!(page.items, &items[40..45]);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 3);

        let clamped = local_page(&items, 9, 20);
        assert_eq!(clamped.current_page, 3);
        assert_eq!(local_page(&items, 0, 20).current_page, 1);
    }

    #[test]
    fn test_local_page_empty() {
        let items: Vec<u32> = Vec::new();
        let page = local_page(&items, 2, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
    }
}
