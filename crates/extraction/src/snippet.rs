use core::ops::Range;

use serde::Serialize;

use pricetruth_core::{EntityRef, ValueObject};

/// A verbatim substring of a source's raw content.
///
/// Only the extractor constructs snippets; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceSnippet {
    text: String,
    source_url: String,
    /// Offset of `text` in the source content, in Unicode scalar values.
    char_offset: usize,
    /// The money expression the snippet was built around.
    price_text: String,
    /// Byte range of `price_text` inside `text`.
    #[serde(skip)]
    price_range: Range<usize>,
}

impl ValueObject for EvidenceSnippet {}

impl EvidenceSnippet {
    pub(crate) fn new(
        text: &str,
        source_url: &str,
        char_offset: usize,
        price_range: Range<usize>,
    ) -> Self {
        Self {
            text: text.to_string(),
            source_url: source_url.to_string(),
            char_offset,
            price_text: text[price_range.clone()].to_string(),
            price_range,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn char_offset(&self) -> usize {
        self.char_offset
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn price_range(&self) -> Range<usize> {
        self.price_range.clone()
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::Snippet {
            source_url: self.source_url.clone(),
            char_offset: self.char_offset,
        }
    }
}
