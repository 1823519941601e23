use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::Source;
use crate::value_object::ValueObject;

/// Reference to a source backing a numeric claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ValueObject for Citation {}

impl Citation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            timestamp: None,
        }
    }

    pub fn from_source(source: &Source) -> Self {
        let title = source.title.trim();
        Self {
            url: source.url.clone(),
            title: (!title.is_empty()).then(|| title.to_string()),
            timestamp: source.retrieved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_source_drops_blank_title() {
        let source = Source::new("https://rival.io/pricing", "  ", "$5/mo");
        let citation = Citation::from_source(&source);
        assert_eq!(citation.url, "https://rival.io/pricing");
        assert_eq!(citation.title, None);
    }

    #[test]
    fn from_source_carries_timestamp() {
        let at = DateTime::parse_from_rfc3339("2026-01-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let source =
            Source::new("https://rival.io/pricing", "Rival pricing", "").with_retrieved_at(at);
        let citation = Citation::from_source(&source);
        assert_eq!(citation.title.as_deref(), Some("Rival pricing"));
        assert_eq!(citation.timestamp, Some(at));
    }
}
