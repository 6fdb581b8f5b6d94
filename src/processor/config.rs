//! Summarizer configuration

use serde::{Deserialize, Serialize};

/// Default fraction of sentences kept in a summary
pub const DEFAULT_RATIO: f64 = 0.2;

/// Order of the sentences in a produced summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOrder {
    /// Selected sentences appear in the order they have in the source text
    #[default]
    Document,

    /// Selected sentences appear by descending score, ties in first-seen order
    Score,
}

/// Options controlling extractive summarization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryOptions {
    /// Fraction of the text's sentences to keep, within [0, 1]
    pub ratio: f64,

    /// Output ordering of the kept sentences
    pub order: SummaryOrder,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            order: SummaryOrder::default(),
        }
    }
}

impl SummaryOptions {
    /// Options with the given ratio and the default ordering
    pub fn with_ratio(ratio: f64) -> Self {
        Self {
            ratio,
            ..Self::default()
        }
    }

    /// Whether the ratio is a usable fraction
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.ratio)
    }
}
