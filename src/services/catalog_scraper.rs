use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header;
use url::Url;

use crate::configuration::ScraperSettings;
use crate::domain::product::{normalize_title, ProductRecord};
use crate::services::extractor::parse_products;

// Used when the configured identity pool is empty.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// Classified response for one page fetch. The dispatcher only classifies;
/// deciding what to do with a rate limit is the retry loop's job.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(String),
    RateLimited { retry_after: Option<u64> },
    Failure(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("upstream returned status {status} for {url}")]
    UpstreamFailure { status: u16, url: String },
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("collection was cancelled")]
    Cancelled,
}

/// Issues one GET and classifies the response.
#[allow(async_fn_in_trait)]
pub trait Dispatch {
    async fn dispatch(&self, url: &str) -> Result<FetchOutcome, CollectError>;
}

pub struct HttpDispatcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
    accept_language: String,
}

impl HttpDispatcher {
    pub fn new(settings: &ScraperSettings) -> Self {
        // No request timeout: a stalled upstream hangs the fetch. Known gap,
        // see DESIGN.md.
        HttpDispatcher {
            client: reqwest::Client::new(),
            user_agents: settings.user_agents.clone(),
            accept_language: settings.accept_language.clone(),
        }
    }
}

impl Dispatch for HttpDispatcher {
    async fn dispatch(&self, url: &str) -> Result<FetchOutcome, CollectError> {
        let user_agent = self
            .user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT);

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .header(header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await
            .map_err(|source| CollectError::Network {
                url: url.to_string(),
                source,
            })?;

        match response.status().as_u16() {
            200 => {
                let body = response
                    .text()
                    .await
                    .map_err(|source| CollectError::Network {
                        url: url.to_string(),
                        source,
                    })?;
                Ok(FetchOutcome::Success(body))
            }
            429 => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse().ok());
                Ok(FetchOutcome::RateLimited { retry_after })
            }
            status => Ok(FetchOutcome::Failure(status)),
        }
    }
}

/// Draws a delay in seconds from an inclusive range. Injected so tests can
/// pin the draw and inspect the requested range.
pub type DelaySampler = Box<dyn Fn(RangeInclusive<u64>) -> u64 + Send + Sync>;

/// Sequential page-by-page collector for the best-seller listing.
///
/// One fetch at a time, with pacing between pages. Concurrent fetching is
/// ruled out on purpose: it would defeat the rate-limit avoidance the whole
/// retry policy is built around.
pub struct CatalogScraper<D = HttpDispatcher> {
    dispatcher: D,
    base_url: Url,
    backoff_secs: RangeInclusive<u64>,
    page_delay_secs: RangeInclusive<u64>,
    sampler: DelaySampler,
    cancel: Arc<AtomicBool>,
}

impl CatalogScraper<HttpDispatcher> {
    pub fn new(settings: &ScraperSettings) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&settings.base_url)?;
        Ok(CatalogScraper::with_dispatcher(
            HttpDispatcher::new(settings),
            base_url,
            settings.backoff_min_secs..=settings.backoff_max_secs,
            settings.page_delay_min_secs..=settings.page_delay_max_secs,
        ))
    }
}

impl<D: Dispatch> CatalogScraper<D> {
    pub fn with_dispatcher(
        dispatcher: D,
        base_url: Url,
        backoff_secs: RangeInclusive<u64>,
        page_delay_secs: RangeInclusive<u64>,
    ) -> Self {
        CatalogScraper {
            dispatcher,
            base_url,
            backoff_secs,
            page_delay_secs,
            sampler: Box::new(|range| rand::thread_rng().gen_range(range)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_sampler(mut self, sampler: DelaySampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Shared flag polled between retry attempts and between pages. Setting
    /// it stops the run at the next such point; mid-fetch it has no effect.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("pg", &page.to_string());
        url
    }

    /// Fetch one page, waiting out 429s for as long as the upstream keeps
    /// sending them.
    ///
    /// There is deliberately no retry ceiling: against a rate limiter the
    /// policy is to wait and try again, not to give up after N attempts.
    /// Any other non-200 status is fatal for the page and returns at once.
    pub async fn fetch_with_retry(&self, url: &str) -> Result<String, CollectError> {
        let mut attempt: u32 = 0;
        let mut waited_secs: u64 = 0;

        loop {
            if self.cancelled() {
                return Err(CollectError::Cancelled);
            }

            match self.dispatcher.dispatch(url).await? {
                FetchOutcome::Success(body) => return Ok(body),
                FetchOutcome::RateLimited { retry_after } => {
                    attempt += 1;
                    let wait = retry_after
                        .unwrap_or_else(|| (self.sampler)(self.backoff_secs.clone()));
                    waited_secs += wait;
                    log::warn!(
                        "Got 429 Too Many Requests on attempt {}. Waiting {}s ({}s waited so far)...",
                        attempt,
                        wait,
                        waited_secs
                    );
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                FetchOutcome::Failure(status) => {
                    log::error!("Failed with status {} on {}", status, url);
                    return Err(CollectError::UpstreamFailure {
                        status,
                        url: url.to_string(),
                    });
                }
            }
        }
    }

    /// Collect records across `page_count` pages, in page order then document
    /// order. Cross-page duplicates are kept as-is; records without a title
    /// are dropped at the end. An empty dataset is a valid outcome.
    pub async fn collect(&self, page_count: u32) -> Result<Vec<ProductRecord>, CollectError> {
        let mut dataset: Vec<ProductRecord> = vec![];

        for page in 1..=page_count {
            if self.cancelled() {
                break;
            }

            let url = self.page_url(page);
            log::info!("Scraping {}", url);

            let body = match self.fetch_with_retry(url.as_str()).await {
                Ok(body) => body,
                Err(CollectError::Cancelled) => break,
                Err(e) => return Err(e),
            };

            let records: Vec<ProductRecord> = parse_products(&body)
                .into_iter()
                .map(|mut record| {
                    record.title = normalize_title(record.title);
                    record
                })
                .collect();
            log::info!("Found {} product cards on page {}", records.len(), page);
            dataset.extend(records);

            if page != page_count {
                let delay = (self.sampler)(self.page_delay_secs.clone());
                log::info!("Waiting {}s before next page...", delay);
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        dataset.retain(ProductRecord::has_title);
        Ok(dataset)
    }
}
