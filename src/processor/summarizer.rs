//! # Extractive Summarizer
//!
//! Shortens page text by keeping its highest-scoring sentences. A sentence
//! scores the sum of the document frequencies of its non-stop-words, so
//! sentences built from the page's recurring vocabulary win.
//!
//! Selection keeps `floor(sentence_count * ratio)` sentences. Ties between
//! equal scores go to the sentence seen first (stable descending sort).
//! The kept sentences are emitted in document order or score order
//! depending on [`SummaryOrder`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{instrument, trace};

use crate::processor::config::{SummaryOptions, SummaryOrder};
use crate::processor::stopwords::is_stop_word;

/// Terminal punctuation, optional closing quotes or brackets, then whitespace
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("sentence boundary pattern must compile")
});

/// Alphanumeric runs, allowing inner apostrophes and hyphens
static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*").expect("word pattern must compile")
});

/// Split text into trimmed, non-empty sentences
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(text) {
        let sentence = text[start..boundary.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Lower-cased words of a text
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|word| word.as_str().to_lowercase())
        .collect()
}

/// Frequency of every non-stop-word in the text
fn word_frequencies(text: &str) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for word in tokenize(text) {
        if !is_stop_word(&word) {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    frequencies
}

/// Summarize text by extracting its top-scoring sentences
///
/// # Arguments
///
/// * `text` - The cleaned page text
/// * `options` - Ratio of sentences to keep and output ordering
///
/// # Returns
///
/// The kept sentences joined by a single space. Empty when the text has no
/// sentences or too few for the ratio to keep one.
#[instrument(skip(text), fields(len = text.len()))]
pub fn summarize(text: &str, options: &SummaryOptions) -> String {
    let sentences = split_sentences(text);
    let select_length = (sentences.len() as f64 * options.ratio).floor() as usize;
    if select_length == 0 {
        return String::new();
    }

    let frequencies = word_frequencies(text);

    // repeated sentences share one candidate: first index, summed score
    let mut candidates: Vec<(usize, &str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (index, sentence) in sentences.iter().enumerate() {
        let score: usize = tokenize(sentence)
            .iter()
            .filter_map(|word| frequencies.get(word))
            .sum();
        match positions.get(sentence) {
            Some(&position) => candidates[position].2 += score,
            None => {
                positions.insert(*sentence, candidates.len());
                candidates.push((index, *sentence, score));
            }
        }
    }
    candidates.retain(|(_, _, score)| *score > 0);

    // stable: equal scores keep first-seen order
    candidates.sort_by(|a, b| b.2.cmp(&a.2));
    candidates.truncate(select_length);

    if options.order == SummaryOrder::Document {
        candidates.sort_by_key(|(index, _, _)| *index);
    }

    trace!(
        "Kept {} of {} sentences",
        candidates.len(),
        sentences.len()
    );

    candidates
        .into_iter()
        .map(|(_, sentence, _)| sentence)
        .collect::<Vec<_>>()
        .join(" ")
}
