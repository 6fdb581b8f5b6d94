//! Aggregation of page summaries into one corpus
//!
//! The corpus is what the tagging step reads. Whitespace in every summary
//! is collapsed to single spaces and summaries are concatenated, each
//! followed by one space. Pages with an empty summary contribute nothing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, instrument};

use crate::crawler::CrawlResult;
use crate::processor::error::ProcessError;

/// Default price in dollars per 1000 prompt tokens
pub const DEFAULT_PRICE_PER_1K_TOKENS: f64 = 0.002;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// The aggregated text of a crawl with its size metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Corpus {
    /// Concatenated, whitespace-normalized summaries
    pub text: String,

    /// Number of pages that contributed a summary
    pub pages: usize,

    /// Approximate number of model tokens in `text`
    pub token_estimate: usize,
}

/// Collapse every whitespace run to a single space
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Approximate the model token count of a text.
///
/// English prose averages roughly four tokens per three words.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 4).div_ceil(3)
}

/// Merge the summaries of a crawl into one corpus
#[instrument(skip(result), fields(pages = result.len()))]
pub fn aggregate(result: &CrawlResult) -> Corpus {
    let mut text = String::new();
    let mut pages = 0;
    for record in result.iter() {
        let summary = normalize_whitespace(&record.summary);
        if summary.trim().is_empty() {
            continue;
        }
        text.push_str(&summary);
        text.push(' ');
        pages += 1;
    }

    let token_estimate = estimate_tokens(&text);
    info!(
        "Aggregated {} summaries into {} characters (~{} tokens)",
        pages,
        text.len(),
        token_estimate
    );

    Corpus {
        text,
        pages,
        token_estimate,
    }
}

impl Corpus {
    /// Estimated prompt cost in dollars at the given price per 1000 tokens
    pub fn estimated_cost(&self, price_per_1k_tokens: f64) -> f64 {
        self.token_estimate as f64 / 1000.0 * price_per_1k_tokens
    }

    /// Write the corpus text, replacing any existing file
    pub async fn write_to(&self, path: &Path) -> Result<(), ProcessError> {
        tokio::fs::write(path, self.text.as_bytes()).await?;
        info!("Combined content written to {}", path.display());
        Ok(())
    }
}

/// Write every page record of a crawl as pretty JSON, replacing any existing file
pub async fn write_records(result: &CrawlResult, path: &Path) -> Result<(), ProcessError> {
    let json = serde_json::to_string_pretty(&result.pages)?;
    tokio::fs::write(path, json).await?;
    info!("Saved {} page records to {}", result.len(), path.display());
    Ok(())
}
