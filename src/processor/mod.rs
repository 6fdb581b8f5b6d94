//! # Content Processor Module
//!
//! This module turns the cleaned text of crawled pages into short
//! extractive summaries and merges those summaries into a single corpus.
//!
//! ## Key Components
//!
//! - `summarize`: Frequency-scored extractive summary of a text
//! - `SummaryOptions`: Ratio of sentences to keep and their output order
//! - `aggregate`: Merge the summaries of a crawl into a `Corpus`
//! - `Corpus`: The combined text with a token and cost estimate
//!
//! ## Features
//!
//! - Sentence splitting and word tokenization without external models
//! - English stop-word filtering
//! - Deterministic tie-breaking by sentence position
//! - Whitespace normalization of the combined corpus

mod aggregator;
mod config;
mod error;
mod stopwords;
mod summarizer;

pub use aggregator::{
    Corpus, DEFAULT_PRICE_PER_1K_TOKENS, aggregate, estimate_tokens, normalize_whitespace,
    write_records,
};
pub use config::{DEFAULT_RATIO, SummaryOptions, SummaryOrder};
pub use error::ProcessError;
pub use stopwords::is_stop_word;
pub use summarizer::{split_sentences, summarize, tokenize};
