//! # sitesift - Website Crawling and Summarization for Service Tagging
//!
//! This crate crawls a single website, extracts the visible text of every
//! page, condenses it into extractive summaries, and merges them into one
//! corpus that a language model tags with the services the site offers.
//!
//! ## Features
//!
//! - Breadth-first, same-host crawling with a page budget
//! - URL skip rules for pagination, media, auth and listing pages
//! - Noise-free text extraction from malformed markup
//! - Frequency-based extractive summarization
//! - Corpus aggregation with token and cost estimates
//! - Rate-limited service tagging through `rig` completion models
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitesift::crawler::{CrawlerConfig, crawl_website};
//! use sitesift::processor::aggregate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_pages(20).workers(4).build();
//!     let result = crawl_website("https://example.com", config).await?;
//!
//!     let corpus = aggregate(&result);
//!     println!("{} pages, ~{} tokens", corpus.pages, corpus.token_estimate);
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod crawler;
pub mod processor;
pub mod tagging;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
