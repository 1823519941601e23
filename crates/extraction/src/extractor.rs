//! Rule-based snippet extraction.
//!
//! The extractor never writes text: every snippet is a slice of the source
//! content, located by the money matchers and bounded by simple rules.

use core::ops::Range;

use serde::{Deserialize, Serialize};

use pricetruth_core::{PipelineError, PipelineResult, Source};

use crate::matchers::{MoneyMatch, find_money};
use crate::snippet::EvidenceSnippet;

/// Smallest `max_snippet_chars` accepted by [`ExtractionConfig::validate`].
pub const MIN_SNIPPET_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound on snippet length, in characters. A money expression that
    /// is itself longer yields no snippet.
    pub max_snippet_chars: usize,
    /// Characters of context kept before the money expression.
    pub context_before: usize,
    /// Characters of context kept after the money expression.
    pub context_after: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: 280,
            context_before: 60,
            context_after: 80,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.max_snippet_chars < MIN_SNIPPET_CHARS {
            return Err(PipelineError::validation(format!(
                "extraction.max_snippet_chars must be >= {MIN_SNIPPET_CHARS} (got {})",
                self.max_snippet_chars
            )));
        }
        for (name, value) in [
            ("context_before", self.context_before),
            ("context_after", self.context_after),
        ] {
            if value > self.max_snippet_chars {
                return Err(PipelineError::validation(format!(
                    "extraction.{name} must be <= max_snippet_chars ({}) (got {value})",
                    self.max_snippet_chars
                )));
            }
        }
        Ok(())
    }
}

/// Pulls verbatim, price-bearing snippets out of source text.
#[derive(Debug, Clone, Default)]
pub struct SnippetExtractor {
    config: ExtractionConfig,
}

impl SnippetExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, source: &Source) -> Vec<EvidenceSnippet> {
        let snippets = self.extract_text(&source.url, &source.raw_content);
        tracing::debug!(url = %source.url, snippets = snippets.len(), "extracted snippets");
        snippets
    }

    /// Extract snippets from `content`, ordered by offset.
    ///
    /// Each snippet carries exactly one money expression: its window stops at
    /// the end of the line and at the neighbouring expressions. Identical
    /// snippet texts collapse to the first occurrence. No match yields an
    /// empty list.
    pub fn extract_text(&self, source_url: &str, content: &str) -> Vec<EvidenceSnippet> {
        let anchors = find_money(content);
        let mut out: Vec<EvidenceSnippet> = Vec::with_capacity(anchors.len());

        for (idx, anchor) in anchors.iter().enumerate() {
            let prev_end = if idx > 0 { anchors[idx - 1].end } else { 0 };
            let next_start = anchors
                .get(idx + 1)
                .map(|next| next.start)
                .unwrap_or(content.len());
            let lower = line_start(content, anchor.start).max(prev_end);
            let upper = line_end(content, anchor.end).min(next_start);

            let Some(window) = self.window(content, anchor, lower, upper) else {
                tracing::debug!(
                    url = %source_url,
                    offset = anchor.start,
                    "money expression longer than a snippet"
                );
                continue;
            };
            let text = &content[window.clone()];
            if out.iter().any(|s| s.text() == text) {
                continue;
            }

            let char_offset = content[..window.start].chars().count();
            let price_range = (anchor.start - window.start)..(anchor.end - window.start);
            out.push(EvidenceSnippet::new(text, source_url, char_offset, price_range));
        }

        out
    }

    fn window(
        &self,
        content: &str,
        anchor: &MoneyMatch,
        lower: usize,
        upper: usize,
    ) -> Option<Range<usize>> {
        let max = self.config.max_snippet_chars;
        let anchor_chars = content[anchor.start..anchor.end].chars().count();
        if anchor_chars > max {
            return None;
        }

        let budget = max - anchor_chars;
        let (before, after) = {
            let (b, a) = (self.config.context_before, self.config.context_after);
            match b.checked_add(a) {
                Some(total) if total <= budget => (b, a),
                _ => {
                    let total = b as u128 + a as u128;
                    let b_share = (budget as u128 * b as u128)
                        .checked_div(total)
                        .unwrap_or(0) as usize;
                    (b_share, budget - b_share)
                }
            }
        };

        let mut start = retreat_chars(content, anchor.start, before, lower);
        let mut end = advance_chars(content, anchor.end, after, upper);

        if start > lower && cuts_word(content, start) {
            start = content[start..anchor.start]
                .find(char::is_whitespace)
                .map(|i| start + i)
                .unwrap_or(anchor.start);
        }
        if end < upper && cuts_word(content, end) {
            end = content[anchor.end..end]
                .rfind(char::is_whitespace)
                .map(|i| anchor.end + i)
                .unwrap_or(anchor.end);
        }

        let slice = &content[start..end];
        let trimmed_start = start + (slice.len() - slice.trim_start_matches(is_edge_filler).len());
        let trimmed_end = start + slice.trim_end_matches(is_edge_filler).len();
        Some(trimmed_start..trimmed_end)
    }
}

/// Unique price expressions across `snippets`, in first-seen order.
pub fn price_texts(snippets: &[EvidenceSnippet]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for snippet in snippets {
        if !out.iter().any(|t| t == snippet.price_text()) {
            out.push(snippet.price_text().to_string());
        }
    }
    out
}

fn line_start(s: &str, idx: usize) -> usize {
    s[..idx].rfind(['\n', '\r']).map(|i| i + 1).unwrap_or(0)
}

fn line_end(s: &str, idx: usize) -> usize {
    s[idx..].find(['\n', '\r']).map(|i| idx + i).unwrap_or(s.len())
}

/// Byte index `n` characters before `from`, not going below `floor`.
fn retreat_chars(s: &str, from: usize, n: usize, floor: usize) -> usize {
    s[floor..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| floor + i)
        .unwrap_or(from)
}

/// Byte index `n` characters after `from`, not going above `ceil`.
fn advance_chars(s: &str, from: usize, n: usize, ceil: usize) -> usize {
    s[from..ceil]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(ceil)
}

/// Whitespace and list separators dropped from snippet edges.
fn is_edge_filler(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | '|' | '·' | '•')
}

/// `true` when `idx` falls between two word characters.
fn cuts_word(s: &str, idx: usize) -> bool {
    let before = s[..idx].chars().next_back();
    let at = s[idx..].chars().next();
    matches!((before, at), (Some(a), Some(b)) if a.is_alphanumeric() && b.is_alphanumeric())
}
