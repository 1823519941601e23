//! `pricetruth-extraction`
//!
//! **Responsibility:** locate price-bearing evidence in raw source text.
//!
//! - Snippets are always verbatim substrings of a source; nothing here
//!   generates or rewrites text.
//! - Extraction is per-source and independent, so callers may run it in
//!   parallel.

pub mod extractor;
pub mod matchers;
pub mod snippet;

pub use extractor::{ExtractionConfig, MIN_SNIPPET_CHARS, SnippetExtractor, price_texts};
pub use matchers::{MoneyMatch, find_money};
pub use snippet::EvidenceSnippet;
