//! Run inputs: retrieved sources and the product under analysis.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{is_http_url, normalize_domain};
use crate::error::{PipelineError, PipelineResult};

/// A page already fetched by the search client.
///
/// `raw_content` is treated as literal text: nothing downstream rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
    pub raw_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<DateTime<Utc>>,
}

impl Source {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            raw_content: raw_content.into(),
            retrieved_at: None,
        }
    }

    pub fn with_retrieved_at(mut self, retrieved_at: DateTime<Utc>) -> Self {
        self.retrieved_at = Some(retrieved_at);
        self
    }

    /// Normalized domain of the source URL. Only meaningful after validation.
    pub fn domain(&self) -> Option<String> {
        normalize_domain(&self.url)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !is_http_url(&self.url) {
            return Err(PipelineError::validation(format!(
                "source url is not an absolute http(s) url: {:?}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Validate an ordered source list as delivered by the search client.
///
/// The client contract is "deduplicated by URL"; a repeated URL is rejected
/// rather than silently merged.
pub fn validate_sources(sources: &[Source]) -> PipelineResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(sources.len());
    for (position, source) in sources.iter().enumerate() {
        source
            .validate()
            .map_err(|e| PipelineError::validation(format!("sources[{position}]: {e}")))?;
        if !seen.insert(source.url.trim()) {
            return Err(PipelineError::validation(format!(
                "sources[{position}]: duplicate url {}",
                source.url
            )));
        }
    }
    Ok(())
}

/// The product whose price is being judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub url: String,
    /// Price exactly as the user stated it (e.g. "$99/month").
    pub current_price_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<String>,
    /// Competitor URL (or bare domain) hints collected by the CLI.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competitor_urls: Vec<String>,
}

impl ProductInput {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        current_price_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            current_price_text: current_price_text.into(),
            pricing_model: None,
            competitor_urls: Vec::new(),
        }
    }

    pub fn with_pricing_model(mut self, model: impl Into<String>) -> Self {
        self.pricing_model = Some(model.into());
        self
    }

    pub fn with_competitor_url(mut self, url: impl Into<String>) -> Self {
        self.competitor_urls.push(url.into());
        self
    }

    /// Normalized domain of the product itself.
    pub fn domain(&self) -> Option<String> {
        normalize_domain(&self.url)
    }

    /// Normalized domains of the competitor hints, in hint order, deduplicated.
    pub fn competitor_domains(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for hint in &self.competitor_urls {
            if let Some(domain) = normalize_domain(hint) {
                if !out.contains(&domain) {
                    out.push(domain);
                }
            }
        }
        out
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.name.trim().is_empty() {
            return Err(PipelineError::validation("product name cannot be empty"));
        }
        if !is_http_url(&self.url) {
            return Err(PipelineError::validation(format!(
                "product url is not an absolute http(s) url: {:?}",
                self.url
            )));
        }
        if self.current_price_text.trim().is_empty() {
            return Err(PipelineError::validation("current price cannot be empty"));
        }
        for hint in &self.competitor_urls {
            if normalize_domain(hint).is_none() {
                return Err(PipelineError::validation(format!(
                    "competitor hint has no usable domain: {hint:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductInput {
        ProductInput::new("Acme Boards", "https://acme.com", "$49/month")
    }

    #[test]
    fn valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn product_rejects_empty_name() {
        let mut p = product();
        p.name = "   ".to_string();
        assert_eq!(
            p.validate().unwrap_err(),
            PipelineError::validation("product name cannot be empty")
        );
    }

    #[test]
    fn product_rejects_empty_price() {
        let mut p = product();
        p.current_price_text = String::new();
        assert!(p.validate().unwrap_err().is_validation());
    }

    #[test]
    fn product_rejects_relative_url() {
        let mut p = product();
        p.url = "acme.com".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn product_rejects_unusable_hint() {
        let p = product().with_competitor_url("not a domain");
        assert!(p.validate().is_err());
    }

    #[test]
    fn competitor_domains_are_normalized_and_deduplicated() {
        let p = product()
            .with_competitor_url("https://www.rival.io/pricing")
            .with_competitor_url("rival.io")
            .with_competitor_url("other.com");
        assert_eq!(p.competitor_domains(), vec!["rival.io", "other.com"]);
    }

    #[test]
    fn duplicate_source_urls_are_rejected() {
        let sources = vec![
            Source::new("https://rival.io/pricing", "Rival", "$10/month"),
            Source::new("https://rival.io/pricing", "Rival", "$10/month"),
        ];
        let err = validate_sources(&sources).unwrap_err();
        assert!(err.to_string().contains("duplicate url"));
    }

    #[test]
    fn source_without_scheme_is_rejected_with_position() {
        let sources = vec![
            Source::new("https://rival.io/pricing", "Rival", ""),
            Source::new("rival.io/plans", "Rival", ""),
        ];
        let err = validate_sources(&sources).unwrap_err();
        assert!(err.to_string().contains("sources[1]"));
    }

    #[test]
    fn source_deserializes_without_timestamp() {
        let json = r#"{"url":"https://rival.io","title":"Rival","raw_content":"$5/mo"}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.retrieved_at, None);
        assert_eq!(source.domain().as_deref(), Some("rival.io"));
    }
}
