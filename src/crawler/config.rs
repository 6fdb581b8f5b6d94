//! # Crawler Configuration Module
//!
//! This module provides configuration options for the crawler: the page
//! budget, worker count, fetch timeout and politeness delay, the URL filter
//! patterns, and the summarization options applied to every page. It uses
//! a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration
//!
//! ## Features
//!
//! - Defaults matching a single sequential breadth-first crawl
//! - Validation of limits before any page is fetched
//! - Optional include/exclude substring patterns for link scoping
//! - Optional CSS selector restricting content extraction
//! - User-agent customization

use std::time::Duration;

use crate::crawler::error::ConfigError;
use crate::crawler::filter::default_skip_patterns;
use crate::processor::SummaryOptions;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of URLs the crawl may visit (fetched or skipped)
    pub max_pages: usize,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Timeout for a single page fetch in milliseconds
    pub fetch_timeout_ms: u64,

    /// Minimum delay between fetches in milliseconds, 0 disables it
    pub rate_limit_ms: u64,

    /// User agent to use for requests
    pub user_agent: String,

    /// Case-insensitive substrings that make a URL skippable
    pub skip_patterns: Vec<String>,

    /// Only follow links containing this substring
    pub match_pattern: Option<String>,

    /// Never follow links containing this substring
    pub exclude_pattern: Option<String>,

    /// CSS selector for the content to extract, whole document when unset
    pub content_selector: Option<String>,

    /// Summarization applied to each page
    pub summary: SummaryOptions,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            workers: 1,
            fetch_timeout_ms: 30_000,
            rate_limit_ms: 0,
            user_agent: format!("sitesift/{}", env!("CARGO_PKG_VERSION")),
            skip_patterns: default_skip_patterns(),
            match_pattern: None,
            exclude_pattern: None,
            content_selector: None,
            summary: SummaryOptions::default(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to visit
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the number of concurrent fetch workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the per-fetch timeout in milliseconds
    pub fn fetch_timeout_ms(mut self, fetch_timeout_ms: u64) -> Self {
        self.config.fetch_timeout_ms = fetch_timeout_ms;
        self
    }

    /// Set the minimum delay between fetches in milliseconds
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Replace the skip patterns
    pub fn skip_patterns(mut self, skip_patterns: Vec<String>) -> Self {
        self.config.skip_patterns = skip_patterns;
        self
    }

    /// Set the substring a link must contain to be followed
    pub fn match_pattern(mut self, match_pattern: Option<String>) -> Self {
        self.config.match_pattern = match_pattern;
        self
    }

    /// Set the substring that excludes a link from being followed
    pub fn exclude_pattern(mut self, exclude_pattern: Option<String>) -> Self {
        self.config.exclude_pattern = exclude_pattern;
        self
    }

    /// Set the CSS selector for content to extract
    pub fn content_selector(mut self, content_selector: Option<String>) -> Self {
        self.config.content_selector = content_selector;
        self
    }

    /// Set the summarization options
    pub fn summary(mut self, summary: SummaryOptions) -> Self {
        self.config.summary = summary;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the per-fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Get the politeness delay as a Duration, if any
    pub fn rate_limit(&self) -> Option<Duration> {
        (self.rate_limit_ms > 0).then(|| Duration::from_millis(self.rate_limit_ms))
    }

    /// Check the limits. Called before a crawl starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroPages);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self.summary.is_valid() {
            return Err(ConfigError::InvalidRatio(self.summary.ratio));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.workers, 1);
        assert!(config.rate_limit().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = CrawlerConfig::builder()
            .max_pages(3)
            .workers(4)
            .rate_limit_ms(250)
            .match_pattern(Some("/services".to_string()))
            .summary(SummaryOptions::with_ratio(0.5))
            .build();

        assert_eq!(config.max_pages, 3);
        assert_eq!(config.workers, 4);
        assert_eq!(config.rate_limit(), Some(Duration::from_millis(250)));
        assert_eq!(config.match_pattern.as_deref(), Some("/services"));
        assert_eq!(config.summary.ratio, 0.5);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let zero_pages = CrawlerConfig::builder().max_pages(0).build();
        assert_eq!(zero_pages.validate(), Err(ConfigError::ZeroPages));

        let zero_workers = CrawlerConfig::builder().workers(0).build();
        assert_eq!(zero_workers.validate(), Err(ConfigError::ZeroWorkers));

        let zero_timeout = CrawlerConfig::builder().fetch_timeout_ms(0).build();
        assert_eq!(zero_timeout.validate(), Err(ConfigError::ZeroTimeout));

        let bad_ratio = CrawlerConfig::builder()
            .summary(SummaryOptions::with_ratio(1.5))
            .build();
        assert_eq!(bad_ratio.validate(), Err(ConfigError::InvalidRatio(1.5)));
    }
}
