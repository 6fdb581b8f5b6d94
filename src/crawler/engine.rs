//! The crawl loop: frontier workers, fetch orchestration, per-page processing

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::content_extraction::{clean_content, clean_content_with_selector, extract_title};
use crate::crawler::error::{ConfigError, CrawlError, FetchError};
use crate::crawler::fetcher::{FetchedPage, HttpFetcher, PageFetcher};
use crate::crawler::filter::FilterConfig;
use crate::crawler::frontier::{Frontier, Pop};
use crate::crawler::{CrawlResult, FailedPage, PageRecord};
use crate::processor::summarize;

/// Lifecycle of a crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Created, not started
    Idle,
    /// Crawl loop running
    Running,
    /// Crawl finished, result handed out
    Done,
}

/// Progress notifications emitted while crawling
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// A page was fetched and summarized
    Fetched { url: String },
    /// A URL matched a skip rule
    Skipped { url: String },
    /// A fetch failed
    Failed { url: String, error: String },
}

/// State shared by the workers of one crawl
struct Shared {
    frontier: Frontier,
    result: CrawlResult,
}

/// Crawls one site with a [`PageFetcher`]
pub struct Crawler<F: PageFetcher> {
    config: CrawlerConfig,
    fetcher: F,
    state: watch::Sender<CrawlState>,
    events: Option<mpsc::UnboundedSender<CrawlEvent>>,
}

impl Crawler<HttpFetcher> {
    /// Create a crawler with an HTTP fetcher
    pub fn http(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(config, fetcher))
    }
}

impl<F: PageFetcher> Crawler<F> {
    /// Create a crawler with the given fetcher
    pub fn new(config: CrawlerConfig, fetcher: F) -> Self {
        let (state, _) = watch::channel(CrawlState::Idle);
        Self {
            config,
            fetcher,
            state,
            events: None,
        }
    }

    /// Send a [`CrawlEvent`] for every processed URL
    pub fn with_events(mut self, events: mpsc::UnboundedSender<CrawlEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> CrawlState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<CrawlState> {
        self.state.subscribe()
    }

    /// Crawl from `seed_url` until the frontier drains or the budget is spent
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlResult, CrawlError> {
        self.crawl_until_cancelled(seed_url, CancellationToken::new())
            .await
    }

    /// Crawl from `seed_url`, stopping early when `cancel` fires
    ///
    /// A cancelled crawl aborts fetches in flight and returns the pages
    /// collected so far with `cancelled` set.
    #[instrument(skip(self, cancel), fields(max_pages = self.config.max_pages))]
    pub async fn crawl_until_cancelled(
        &self,
        seed_url: &str,
        cancel: CancellationToken,
    ) -> Result<CrawlResult, CrawlError> {
        self.config.validate()?;
        let seed = parse_seed(seed_url)?;

        let started = self.state.send_if_modified(|state| {
            if *state == CrawlState::Idle {
                *state = CrawlState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(CrawlError::AlreadyStarted);
        }

        info!("Starting crawl for {}", seed);
        debug!("Crawler config: {:?}", self.config);

        let filter = FilterConfig::new(
            seed.clone(),
            &self.config.skip_patterns,
            self.config.match_pattern.clone(),
            self.config.exclude_pattern.clone(),
        );
        let shared = Mutex::new(Shared {
            frontier: Frontier::new(seed.to_string(), self.config.max_pages),
            result: CrawlResult::default(),
        });
        let notify = Notify::new();
        let limiter = self
            .config
            .rate_limit()
            .and_then(Quota::with_period)
            .map(RateLimiter::direct);

        let workers = (0..self.config.workers).map(|id| {
            self.worker(&filter, &shared, &notify, limiter.as_ref(), &cancel)
                .instrument(info_span!("crawl_worker", id))
        });
        futures::future::join_all(workers).await;

        let Shared {
            frontier,
            mut result,
        } = shared.into_inner();
        result.visited = frontier.visited_len();
        result.cancelled = cancel.is_cancelled();

        self.state.send_replace(CrawlState::Done);
        info!(
            "Crawl finished: {} pages summarized, {} visited, {} skipped, {} failed",
            result.len(),
            result.visited,
            result.skipped,
            result.failures.len()
        );
        Ok(result)
    }

    async fn worker(
        &self,
        filter: &FilterConfig,
        shared: &Mutex<Shared>,
        notify: &Notify,
        limiter: Option<&DefaultDirectRateLimiter>,
        cancel: &CancellationToken,
    ) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let url = {
                let mut guard = shared.lock().await;
                let next = loop {
                    match guard.frontier.pop(filter) {
                        Pop::Skipped(url) => {
                            debug!("Skipping: {}", url);
                            guard.result.skipped += 1;
                            self.emit(CrawlEvent::Skipped { url });
                        }
                        other => break other,
                    }
                };
                match next {
                    Pop::Fetch(url) => url,
                    Pop::Wait => {
                        // registered before the lock is released so no wakeup is lost
                        let notified = notify.notified();
                        drop(guard);
                        tokio::select! {
                            _ = notified => continue,
                            _ = cancel.cancelled() => break,
                        }
                    }
                    Pop::Done | Pop::Skipped(_) => break,
                }
            };

            if let Some(limiter) = limiter {
                tokio::select! {
                    _ = limiter.until_ready() => {}
                    _ = cancel.cancelled() => {
                        shared.lock().await.frontier.release(&url);
                        notify.notify_waiters();
                        break;
                    }
                }
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = timeout(self.config.fetch_timeout(), self.fetcher.fetch(&url)) => {
                    Some(outcome.unwrap_or(Err(FetchError::Timeout(self.config.fetch_timeout_ms))))
                }
            };

            match fetched {
                None => {
                    debug!("Fetch of {} aborted by cancellation", url);
                    shared.lock().await.frontier.release(&url);
                    notify.notify_waiters();
                    break;
                }
                Some(Ok(page)) => {
                    let FetchedPage { html, links, .. } = page;
                    let record = {
                        let _page_span = info_span!("process_page", url = %url).entered();
                        let record = self.process_page(&url, &html);
                        info!("Crawled: {}", url);
                        record
                    };

                    let mut guard = shared.lock().await;
                    let queued = guard.frontier.complete(&url, links, filter);
                    debug!("Queued {} new links from {}", queued, url);
                    guard.result.insert(record);
                    drop(guard);
                    self.emit(CrawlEvent::Fetched { url });
                }
                Some(Err(error)) => {
                    warn!("Error crawling {}: {}", url, error);
                    let mut guard = shared.lock().await;
                    guard.frontier.release(&url);
                    guard.result.failures.push(FailedPage {
                        url: url.clone(),
                        error: error.to_string(),
                    });
                    drop(guard);
                    self.emit(CrawlEvent::Failed {
                        url,
                        error: error.to_string(),
                    });
                }
            }
            notify.notify_waiters();
        }
    }

    fn process_page(&self, url: &str, html: &str) -> PageRecord {
        let title = extract_title(html).unwrap_or_else(|e| {
            warn!("Failed to extract title from {}: {}", url, e);
            None
        });
        let cleaned_text = match &self.config.content_selector {
            Some(selector) => clean_content_with_selector(html, selector),
            None => clean_content(html),
        };
        let summary = summarize(&cleaned_text, &self.config.summary);

        PageRecord {
            url: url.to_string(),
            title,
            cleaned_text,
            summary,
        }
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Crawl a website over HTTP
///
/// # Arguments
///
/// * `url` - The seed URL
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The summarized pages and crawl statistics
pub async fn crawl_website(url: &str, config: CrawlerConfig) -> Result<CrawlResult, CrawlError> {
    Crawler::http(config)?.crawl(url).await
}

fn parse_seed(seed_url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSeed {
        url: seed_url.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = seed_url.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    let seed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(seed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if seed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(seed)
}
