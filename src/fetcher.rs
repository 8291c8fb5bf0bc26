//! Single-page fetching with bounded retry.
//!
//! [`PageTransport`] performs exactly one attempt; [`PageFetcher`] decides
//! whether the answer is usable and retries with a fixed delay when it is not.

use std::future::Future;
use std::time::Duration;

use crate::data_models::{SearchEnvelope, SearchPage};
use crate::error::{FetchError, RankError};
use crate::request::{SearchHeaders, SearchParams};

/// One request against the search endpoint.
///
/// Implementations must be usable from many concurrent page fetches at once.
pub trait PageTransport: Send + Sync {
    fn get_page(
        &self,
        params: &SearchParams,
        headers: &SearchHeaders,
    ) -> impl Future<Output = Result<SearchPage, FetchError>> + Send;
}

/// Build the pooled HTTP client shared by every search.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, RankError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| RankError::Config(format!("failed to build HTTP client: {e}")))
}

/// [`PageTransport`] over a caller-owned `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> HttpTransport {
        HttpTransport {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl PageTransport for HttpTransport {
    async fn get_page(
        &self,
        params: &SearchParams,
        headers: &SearchHeaders,
    ) -> Result<SearchPage, FetchError> {
        let mut request = self.client.get(&self.endpoint).query(params);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        // Served as text/plain; the body is JSON regardless.
        let body = response.bytes().await?;
        let envelope: SearchEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }
}

pub struct PageFetcher<T> {
    transport: T,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: PageTransport> PageFetcher<T> {
    pub fn new(transport: T, max_retries: u32, retry_delay: Duration) -> PageFetcher<T> {
        PageFetcher {
            transport,
            max_retries,
            retry_delay,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch one page, trying up to `max_retries + 1` times.
    ///
    /// Returns `None` when no attempt produced a valid page. Transport errors
    /// are logged and count as a used attempt.
    pub async fn fetch_page(
        &self,
        params: &SearchParams,
        headers: &SearchHeaders,
    ) -> Option<SearchPage> {
        let page_number = params.page().unwrap_or(1);

        for attempt in 0..=self.max_retries {
            match self.transport.get_page(params, headers).await {
                Ok(page) if page.is_valid() => {
                    log::debug!(
                        "page {page_number} fetched on attempt {attempt}: {} products of {}",
                        page.products.len(),
                        page.total
                    );
                    return Some(page);
                }
                Ok(page) => {
                    log::debug!(
                        "page {page_number} incomplete on attempt {attempt} ({} products), retrying",
                        page.products.len()
                    );
                }
                Err(e) => {
                    log::debug!("page {page_number} attempt {attempt} failed: {:#}", e);
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        log::warn!(
            "no valid data for page {page_number} after {} attempts",
            self.max_retries + 1
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::RawProduct;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of attempt outcomes, then keeps failing.
    struct SequenceTransport {
        responses: Mutex<VecDeque<Result<SearchPage, FetchError>>>,
        attempts: AtomicUsize,
    }

    impl SequenceTransport {
        fn new(responses: Vec<Result<SearchPage, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                attempts: AtomicUsize::new(0),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl PageTransport for SequenceTransport {
        async fn get_page(
            &self,
            _params: &SearchParams,
            _headers: &SearchHeaders,
        ) -> Result<SearchPage, FetchError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(SearchPage::default()))
        }
    }

    fn page_with(count: u64, total: u64) -> SearchPage {
        SearchPage {
            products: (0..count)
                .map(|id| RawProduct {
                    id,
                    ..Default::default()
                })
                .collect(),
            total,
        }
    }

    fn unavailable() -> Result<SearchPage, FetchError> {
        Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }

    fn request() -> (SearchParams, SearchHeaders) {
        (SearchParams::new("red dress", None), SearchHeaders::new(None))
    }

    #[tokio::test(start_paused = true)]
    async fn valid_after_three_invalid_attempts() {
        let transport = SequenceTransport::new(vec![
            Ok(page_with(0, 0)),
            Ok(page_with(1, 1)),
            unavailable(),
            Ok(page_with(5, 40)),
        ]);
        let delay = Duration::from_millis(200);
        let fetcher = PageFetcher::new(transport, 10, delay);
        let (params, headers) = request();

        let started = tokio::time::Instant::now();
        let page = fetcher.fetch_page(&params, &headers).await;
        let elapsed = started.elapsed();

        let page = page.expect("fourth attempt is valid");
        assert_eq!(page.total, 40);
        assert_eq!(page.products.len(), 5);
        assert_eq!(fetcher.transport().attempts(), 4);
        assert!(elapsed >= delay * 3);
        assert!(elapsed < delay * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_yield_nothing() {
        let transport = SequenceTransport::new(vec![
            Ok(page_with(1, 1)),
            Ok(page_with(1, 1)),
            Ok(page_with(1, 1)),
            Ok(page_with(10, 10)),
        ]);
        let fetcher = PageFetcher::new(transport, 2, Duration::from_millis(200));
        let (params, headers) = request();

        assert!(fetcher.fetch_page(&params, &headers).await.is_none());
        assert_eq!(fetcher.transport().attempts(), 3);
    }

    #[tokio::test]
    async fn first_valid_response_stops_retrying() {
        let transport = SequenceTransport::new(vec![Ok(page_with(2, 2))]);
        let fetcher = PageFetcher::new(transport, 10, Duration::from_millis(200));
        let (params, headers) = request();

        assert!(fetcher.fetch_page(&params, &headers).await.is_some());
        assert_eq!(fetcher.transport().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let transport = SequenceTransport::new(vec![unavailable(), Ok(page_with(3, 3))]);
        let fetcher = PageFetcher::new(transport, 0, Duration::from_millis(200));
        let (params, headers) = request();

        let started = tokio::time::Instant::now();
        assert!(fetcher.fetch_page(&params, &headers).await.is_none());
        assert_eq!(fetcher.transport().attempts(), 1);
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[test]
    fn build_client_succeeds() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
