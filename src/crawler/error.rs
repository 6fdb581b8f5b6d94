//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The crawl was configured with an invalid seed or limit
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The page fetcher could not be started
    #[error("Failed to launch fetcher: {0}")]
    Launch(String),

    /// The crawler already ran; each crawl needs a fresh crawler
    #[error("Crawler has already been started")]
    AlreadyStarted,
}

/// Configuration problems detected before any page is fetched
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The seed URL is empty or cannot be parsed
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed {
        /// The rejected seed
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The page budget is zero
    #[error("max_pages must be greater than zero")]
    ZeroPages,

    /// The worker count is zero
    #[error("workers must be greater than zero")]
    ZeroWorkers,

    /// The per-fetch timeout is zero
    #[error("fetch_timeout_ms must be greater than zero")]
    ZeroTimeout,

    /// The summary ratio is outside [0, 1]
    #[error("summary ratio must be within [0, 1], got {0}")]
    InvalidRatio(f64),
}

/// Error raised by a page fetch. Always scoped to a single URL.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    /// Connection, DNS or body read failure
    #[error("network error: {0}")]
    Network(String),

    /// The fetch did not complete within the configured timeout
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The navigation was aborted (cancellation, redirect loop, bad URL)
    #[error("navigation aborted: {0}")]
    Navigation(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_redirect() || err.is_builder() {
            FetchError::Navigation(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Markup or selector problems. Extraction degrades instead of failing.
#[derive(Debug, Error, Clone)]
pub enum ParseError {
    /// The CSS selector could not be parsed
    #[error("invalid selector '{selector}': {reason}")]
    Selector {
        /// The rejected selector
        selector: String,
        /// Parser message
        reason: String,
    },
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Config(e) => CrateError::Config(e.to_string()),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
