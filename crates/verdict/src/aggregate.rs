//! Competitor aggregation: per-source evidence grouped by normalized domain.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use pricetruth_core::{
    Citation, EntityRef, Gap, GapCode, GapLedger, ProductInput, Source, push_unique,
};
use pricetruth_extraction::{EvidenceSnippet, SnippetExtractor};
use pricetruth_pricing::{
    FxTable, NormalizationOutcome, NormalizedPrice, ParseFailure, ParsedPrice, normalize,
    parse_snippet,
};

/// What one snippet yielded.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceEvidence {
    Parsed {
        price: ParsedPrice,
        outcome: NormalizationOutcome,
    },
    Failed {
        snippet: EntityRef,
        price_text: String,
        failure: ParseFailure,
    },
}

impl PriceEvidence {
    pub fn from_snippet(snippet: &EvidenceSnippet, fx: &FxTable) -> Self {
        match parse_snippet(snippet) {
            Ok(price) => {
                let outcome = normalize(&price, fx);
                PriceEvidence::Parsed { price, outcome }
            }
            Err(failure) => PriceEvidence::Failed {
                snippet: snippet.entity_ref(),
                price_text: snippet.price_text().to_string(),
                failure,
            },
        }
    }

    /// The gap this evidence raises, if it did not produce a value.
    pub fn gap(&self) -> Option<Gap> {
        match self {
            PriceEvidence::Parsed {
                outcome: NormalizationOutcome::Normalized(_),
                ..
            } => None,
            PriceEvidence::Parsed {
                price,
                outcome: NormalizationOutcome::Blocked(blocked),
            } => Some(blocked.to_gap(price.price_text(), price.origin().entity_ref())),
            PriceEvidence::Failed {
                snippet,
                price_text,
                failure,
            } => Some(failure.to_gap(price_text, snippet.clone())),
        }
    }
}

/// Output of the per-source stage: everything extracted, parsed and
/// normalized from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEvidence {
    position: usize,
    domain: Option<String>,
    citation: Citation,
    snippets: Vec<EvidenceSnippet>,
    evidence: Vec<PriceEvidence>,
}

impl SourceEvidence {
    pub fn collect(
        position: usize,
        source: &Source,
        extractor: &SnippetExtractor,
        fx: &FxTable,
    ) -> Self {
        let snippets = extractor.extract(source);
        let evidence = snippets
            .iter()
            .map(|snippet| PriceEvidence::from_snippet(snippet, fx))
            .collect();
        Self {
            position,
            domain: source.domain(),
            citation: Citation::from_source(source),
            snippets,
            evidence,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn snippets(&self) -> &[EvidenceSnippet] {
        &self.snippets
    }

    pub fn evidence(&self) -> &[PriceEvidence] {
        &self.evidence
    }
}

/// Everything known about one competitor, keyed by normalized domain.
///
/// Built only by [`aggregate`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorPricing {
    competitor_name: String,
    domain: String,
    extracted_price_texts: Vec<String>,
    evidence_snippets: Vec<EvidenceSnippet>,
    parsed_prices: Vec<ParsedPrice>,
    #[serde(rename = "normalized_monthly_usd", serialize_with = "monthly_usd")]
    normalized: Option<NormalizedPrice>,
    notes: Vec<String>,
    citations: Vec<Citation>,
    gaps: GapLedger,
    no_evidence_found: bool,
}

fn monthly_usd<S: Serializer>(
    value: &Option<NormalizedPrice>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    value
        .as_ref()
        .map(NormalizedPrice::monthly_usd)
        .serialize(serializer)
}

impl CompetitorPricing {
    fn new(domain: &str) -> Self {
        Self {
            competitor_name: domain.to_string(),
            domain: domain.to_string(),
            extracted_price_texts: Vec::new(),
            evidence_snippets: Vec::new(),
            parsed_prices: Vec::new(),
            normalized: None,
            notes: Vec::new(),
            citations: Vec::new(),
            gaps: GapLedger::new(),
            no_evidence_found: false,
        }
    }

    pub fn competitor_name(&self) -> &str {
        &self.competitor_name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn extracted_price_texts(&self) -> &[String] {
        &self.extracted_price_texts
    }

    pub fn evidence_snippets(&self) -> &[EvidenceSnippet] {
        &self.evidence_snippets
    }

    pub fn parsed_prices(&self) -> &[ParsedPrice] {
        &self.parsed_prices
    }

    pub fn normalized(&self) -> Option<&NormalizedPrice> {
        self.normalized.as_ref()
    }

    pub fn normalized_monthly_usd(&self) -> Option<f64> {
        self.normalized.as_ref().map(NormalizedPrice::monthly_usd)
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn gaps(&self) -> &[Gap] {
        self.gaps.as_slice()
    }

    pub fn no_evidence_found(&self) -> bool {
        self.no_evidence_found
    }

    /// A competitor is comparable once it has a normalized price.
    pub fn is_comparable(&self) -> bool {
        self.normalized.is_some()
    }

    /// The snippet the normalized value was parsed from.
    pub fn normalized_snippet(&self) -> Option<&EvidenceSnippet> {
        let origin = self.normalized.as_ref()?.origin();
        self.evidence_snippets.iter().find(|s| origin.is_snippet(s))
    }

    fn absorb(&mut self, source: SourceEvidence) {
        if source.snippets.is_empty() {
            return;
        }
        push_unique(&mut self.citations, source.citation);

        for snippet in source.snippets {
            if !self.extracted_price_texts.iter().any(|t| t == snippet.price_text()) {
                self.extracted_price_texts.push(snippet.price_text().to_string());
            }
            self.evidence_snippets.push(snippet);
        }

        for evidence in source.evidence {
            if let Some(gap) = evidence.gap() {
                self.gaps.record(gap);
            }
            match evidence {
                PriceEvidence::Parsed { price, outcome } => {
                    if let NormalizationOutcome::Normalized(value) = outcome {
                        self.accept(value);
                    }
                    self.parsed_prices.push(price);
                }
                PriceEvidence::Failed { .. } => {}
            }
        }
    }

    fn accept(&mut self, value: NormalizedPrice) {
        if self.normalized.is_none() {
            self.notes.push(format!("normalized: {}", value.method()));
            self.normalized = Some(value);
        } else {
            self.notes.push(format!(
                "not used, an earlier price was already normalized: {}",
                value.method()
            ));
        }
    }

    fn finish(&mut self) {
        if self.evidence_snippets.is_empty() {
            self.no_evidence_found = true;
            self.gaps.record(Gap::new(
                GapCode::NoEvidenceFound,
                format!("no pricing evidence found for {}", self.domain),
                EntityRef::Competitor {
                    domain: self.domain.clone(),
                },
            ));
        }
    }
}

/// Merge per-source evidence into one record per competitor domain.
///
/// Records appear in first-appearance order, followed by hinted competitors
/// that had no source. Sources on the product's own domain are skipped.
pub fn aggregate(
    product: &ProductInput,
    mut per_source: Vec<SourceEvidence>,
) -> Vec<CompetitorPricing> {
    per_source.sort_by_key(|s| s.position);
    let own_domain = product.domain();

    let mut records: Vec<CompetitorPricing> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for source in per_source {
        let Some(domain) = source.domain.clone() else {
            tracing::warn!(position = source.position, "source without a usable domain skipped");
            continue;
        };
        if own_domain.as_deref() == Some(domain.as_str()) {
            tracing::debug!(%domain, "skipping the product's own domain");
            continue;
        }
        let slot = *index.entry(domain.clone()).or_insert_with(|| {
            records.push(CompetitorPricing::new(&domain));
            records.len() - 1
        });
        records[slot].absorb(source);
    }

    for domain in product.competitor_domains() {
        if own_domain.as_deref() == Some(domain.as_str()) || index.contains_key(&domain) {
            continue;
        }
        index.insert(domain.clone(), records.len());
        records.push(CompetitorPricing::new(&domain));
    }

    for record in &mut records {
        record.finish();
        tracing::debug!(
            domain = record.domain(),
            snippets = record.evidence_snippets().len(),
            comparable = record.is_comparable(),
            "competitor aggregated"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductInput {
        ProductInput::new("Acme", "https://acme.com", "$50/month")
    }

    fn collect(sources: &[Source]) -> Vec<SourceEvidence> {
        let extractor = SnippetExtractor::default();
        let fx = FxTable::new();
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| SourceEvidence::collect(i, s, &extractor, &fx))
            .collect()
    }

    #[test]
    fn groups_by_normalized_domain() {
        let sources = vec![
            Source::new("https://www.rival.io/pricing", "Rival pricing", "Pro $25/month"),
            Source::new("https://RIVAL.io/blog", "Rival blog", "Team $99/month"),
            Source::new("https://other.com", "Other", "Basic $10 per month"),
        ];
        let records = aggregate(&product(), collect(&sources));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].domain(), "rival.io");
        assert_eq!(records[0].evidence_snippets().len(), 2);
        assert_eq!(records[0].citations().len(), 2);
        assert_eq!(records[1].domain(), "other.com");
    }

    #[test]
    fn first_normalized_price_wins() {
        let sources = vec![Source::new(
            "https://rival.io/pricing",
            "Rival",
            "Starter $10/month\nPro $30/month",
        )];
        let records = aggregate(&product(), collect(&sources));
        let rival = &records[0];
        assert_eq!(rival.normalized_monthly_usd(), Some(10.0));
        assert_eq!(rival.extracted_price_texts(), &["$10/month", "$30/month"]);
        assert_eq!(rival.notes().len(), 2);
        assert!(rival.notes()[1].contains("$30/month"));
        assert_eq!(rival.normalized_snippet().unwrap().price_text(), "$10/month");
    }

    #[test]
    fn per_seat_without_count_stays_null_with_gap() {
        let sources = vec![Source::new("https://rival.io", "Rival", "Teams: $10/seat/month")];
        let records = aggregate(&product(), collect(&sources));
        assert_eq!(records[0].normalized_monthly_usd(), None);
        assert!(!records[0].is_comparable());
        let gap = &records[0].gaps()[0];
        assert_eq!(gap.reason_code, GapCode::PerSeatWithoutSeatCount);
        assert!(gap.message.contains("per-seat pricing without seat count"));
    }

    #[test]
    fn zero_evidence_competitors_are_flagged() {
        let sources = vec![Source::new("https://rival.io", "Rival", "Contact sales for pricing")];
        let product = product().with_competitor_url("https://hinted.dev/pricing");
        let records = aggregate(&product, collect(&sources));
        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.no_evidence_found());
            assert_eq!(record.gaps()[0].reason_code, GapCode::NoEvidenceFound);
            assert!(record.citations().is_empty());
        }
        assert_eq!(records[1].domain(), "hinted.dev");
    }

    #[test]
    fn own_domain_is_not_a_competitor() {
        let sources = vec![
            Source::new("https://acme.com/pricing", "Acme", "Pro $50/month"),
            Source::new("https://rival.io", "Rival", "Pro $25/month"),
        ];
        let product = product().with_competitor_url("www.acme.com");
        let records = aggregate(&product, collect(&sources));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].domain(), "rival.io");
    }

    #[test]
    fn parse_failures_become_gaps_on_the_record() {
        let sources = vec![Source::new(
            "https://rival.io",
            "Rival",
            "Lifetime deal: $199 one-time",
        )];
        let records = aggregate(&product(), collect(&sources));
        assert_eq!(records[0].gaps()[0].reason_code, GapCode::UnsupportedCadence);
        assert!(records[0].parsed_prices().is_empty());
        assert!(!records[0].no_evidence_found());
    }

    #[test]
    fn serializes_normalized_value_as_number() {
        let sources = vec![Source::new("https://rival.io", "Rival", "Pro $25/month")];
        let records = aggregate(&product(), collect(&sources));
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["normalized_monthly_usd"], serde_json::json!(25.0));
        assert_eq!(json["no_evidence_found"], serde_json::json!(false));
        assert_eq!(json["evidence_snippets"][0]["text"], serde_json::json!("Pro $25/month"));
    }
}
