//! # Website Crawler Module
//!
//! This module crawls a single website breadth-first from a seed URL,
//! extracts the visible text of every page, and summarizes it. It is the
//! first stage of the pipeline; its [`CrawlResult`] feeds the aggregator.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Page budget, workers, timeouts and filter patterns
//! - `Crawler`: The frontier-driven crawl loop over a `PageFetcher`
//! - `FilterConfig`: Skip rules and same-domain scoping for URLs
//! - `PageRecord`: The cleaned text and summary of one page
//! - `crawl_website`: Crawl a site over HTTP with the given configuration
//!
//! ## Features
//!
//! - Iterative breadth-first traversal with a visited set
//! - Page budget enforced before every fetch
//! - Optional bounded pool of concurrent fetchers
//! - Per-fetch timeouts and cancellation with partial results
//! - Per-page failures are logged and recorded, never fatal

mod config;
mod content_extraction;
mod engine;
mod error;
mod fetcher;
pub mod filter;
mod frontier;

pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use content_extraction::{
    clean_content, clean_content_with_selector, extract_links, extract_title,
};
pub use engine::{CrawlEvent, CrawlState, Crawler, crawl_website};
pub use error::{ConfigError, CrawlError, FetchError, ParseError};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
pub use filter::{FilterConfig, should_crawl, should_skip};
pub use frontier::{Frontier, Pop};

use serde::{Deserialize, Serialize};

/// A successfully crawled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL the page was requested at
    pub url: String,

    /// Title of the page
    pub title: Option<String>,

    /// Visible text of the page, one block per line
    pub cleaned_text: String,

    /// Extractive summary of the text, possibly empty
    pub summary: String,
}

/// A URL whose fetch failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPage {
    /// The URL
    pub url: String,

    /// What went wrong
    pub error: String,
}

/// Everything a crawl produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Summarized pages in the order they were completed. URLs are unique.
    pub pages: Vec<PageRecord>,

    /// Number of URLs visited: fetched successfully or skipped. Failed fetches are not counted.
    pub visited: usize,

    /// Number of URLs rejected by the skip rules
    pub skipped: usize,

    /// Fetches that failed
    pub failures: Vec<FailedPage>,

    /// Whether the crawl stopped because it was cancelled
    pub cancelled: bool,
}

impl CrawlResult {
    /// Add a page record
    pub fn insert(&mut self, record: PageRecord) {
        self.pages.push(record);
    }

    /// Look up the record for a URL
    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|page| page.url == url)
    }

    /// URLs of the summarized pages
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.url.as_str())
    }

    /// Iterate over the page records
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter()
    }

    /// Number of summarized pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page was summarized
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_result_lookup() {
        let mut result = CrawlResult::default();
        assert!(result.is_empty());

        result.insert(PageRecord {
            url: "https://example.com/".to_string(),
            title: Some("Home".to_string()),
            cleaned_text: "Welcome".to_string(),
            summary: String::new(),
        });

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("https://example.com/").unwrap().title.as_deref(), Some("Home"));
        assert!(result.get("https://example.com/missing").is_none());
        assert_eq!(result.urls().collect::<Vec<_>>(), vec!["https://example.com/"]);
    }
}
