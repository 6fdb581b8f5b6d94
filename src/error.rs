//! Error types for the sitesift crate

use thiserror::Error;

/// Result type for sitesift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitesift operations
#[derive(Debug, Error)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid crawl configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Service tagging error
    #[error("Tagging error: {0}")]
    Tagging(String),
}
