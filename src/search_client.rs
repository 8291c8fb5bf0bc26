use std::time::Duration;

use futures::future::join_all;

use crate::config::DEFAULT_SEARCH_ENDPOINT;
use crate::data_models::ProductRankResult;
use crate::error::{RankError, Result};
use crate::fetcher::{HttpTransport, PageFetcher, PageTransport};
use crate::request::{CorrelationId, SearchHeaders, SearchParams};

/// Constructor-time knobs of [`WbSearchClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Search endpoint URL, used by [`WbSearchClient::with_http_client`].
    pub endpoint: String,
    /// Extra attempts per page after the first one.
    pub max_retries: u32,
    /// Hard cap on how many pages a single search may touch.
    pub max_pages: u32,
    /// Nominal number of products per result page.
    pub page_item_count: u32,
    /// Pause between attempts for the same page.
    pub retry_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_retries: 10,
            max_pages: 50,
            page_item_count: 100,
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl ClientOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(RankError::Config("max_pages must be greater than 0".into()));
        }
        if self.page_item_count == 0 {
            return Err(RankError::Config(
                "page_item_count must be greater than 0".into(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(RankError::Config("endpoint must not be empty".into()));
        }
        Ok(())
    }
}

/// Last page worth fetching for a query with `total` results.
pub fn page_limit(total: u64, page_item_count: u32, max_pages: u32) -> u32 {
    let by_total = 1 + total / u64::from(page_item_count.max(1));
    by_total.min(u64::from(max_pages)) as u32
}

/// Locates a product in the search results of a query.
pub struct WbSearchClient<T = HttpTransport> {
    fetcher: PageFetcher<T>,
    max_pages: u32,
    page_item_count: u32,
}

impl WbSearchClient<HttpTransport> {
    /// Client over an externally owned, pooled `reqwest::Client`.
    pub fn with_http_client(client: reqwest::Client, options: ClientOptions) -> Result<Self> {
        let transport = HttpTransport::new(client, options.endpoint.clone());
        Self::new(transport, options)
    }
}

impl<T: PageTransport> WbSearchClient<T> {
    pub fn new(transport: T, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            fetcher: PageFetcher::new(transport, options.max_retries, options.retry_delay),
            max_pages: options.max_pages,
            page_item_count: options.page_item_count,
        })
    }

    pub fn page_item_count(&self) -> u32 {
        self.page_item_count
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }

    /// Find the page and 1-based position of `item_id` in the results for `query`.
    ///
    /// Page 1 is fetched alone; if the item is not there, every remaining page
    /// up to the page limit is fetched concurrently and scanned in page order.
    ///
    /// # Errors
    ///
    /// [`RankError::General`] if page 1 never yields a valid payload,
    /// [`RankError::NoProducts`] if the query has zero results.
    /// An item absent from every scanned page is `Ok(None)`.
    pub async fn search(&self, query: &str, item_id: u64) -> Result<Option<ProductRankResult>> {
        let query_id = CorrelationId::generate();
        let params = SearchParams::new(query, None);
        let headers = SearchHeaders::new(Some(&query_id));
        log::debug!("searching {query:?} for item {item_id}, query id {query_id}");

        let first_page = self
            .fetcher
            .fetch_page(&params, &headers)
            .await
            .ok_or(RankError::General)?;

        if first_page.total == 0 {
            return Err(RankError::NoProducts);
        }

        if let Some((position, product)) = first_page.find_item(item_id) {
            log::info!("item {item_id} found on page 1, position {position}");
            return Ok(Some(ProductRankResult::new(
                product.into(),
                query.to_string(),
                1,
                position,
            )));
        }

        let last_page = page_limit(first_page.total, self.page_item_count, self.max_pages);
        if last_page < 2 {
            log::info!(
                "item {item_id} not found, {} results fit on one page",
                first_page.total
            );
            return Ok(None);
        }

        let batched_params: Vec<SearchParams> =
            (2..=last_page).map(|page| params.with_page(page)).collect();
        log::debug!("fetching pages 2..={last_page} for query id {query_id}");

        // join_all keeps input order, so results line up with page numbers
        // whatever order the requests finish in.
        let pages = join_all(
            batched_params
                .iter()
                .map(|page_params| self.fetcher.fetch_page(page_params, &headers)),
        )
        .await;

        for (page_number, page) in (2..=last_page).zip(pages) {
            let Some(page) = page else {
                log::warn!("skipping page {page_number} without valid data, query id {query_id}");
                continue;
            };
            if let Some((position, product)) = page.find_item(item_id) {
                log::info!("item {item_id} found on page {page_number}, position {position}");
                return Ok(Some(ProductRankResult::new(
                    product.into(),
                    query.to_string(),
                    page_number,
                    position,
                )));
            }
        }

        log::info!("item {item_id} not found in {last_page} pages");
        Ok(None)
    }
}
