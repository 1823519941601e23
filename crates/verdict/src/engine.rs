//! Deterministic verdict computation and the pre-emission contract checks.

use std::collections::HashSet;

use pricetruth_core::{
    Citation, EntityRef, Gap, GapCode, GapLedger, PipelineError, PipelineResult, ProductInput,
    push_unique,
};
use pricetruth_pricing::{FxTable, NormalizationOutcome, normalize, parse_text};

use crate::aggregate::CompetitorPricing;
use crate::config::VerdictConfig;
use crate::stats::Distribution;
use crate::verdict::{Confidence, ConfidenceLevel, PricingVerdict, VerdictStatus};

/// Fewest comparable competitors needed for a verdict.
pub const MIN_COMPARABLE: usize = 2;

#[derive(Debug, Clone)]
pub struct VerdictEngine {
    config: VerdictConfig,
    fx: FxTable,
}

impl VerdictEngine {
    pub fn new(config: VerdictConfig, fx: FxTable) -> Self {
        Self { config, fx }
    }

    /// Compute the verdict for `product` against the aggregated competitors.
    ///
    /// Thin evidence yields `UNDETERMINABLE`, never an error; only a broken
    /// internal guarantee returns `Err(ContractViolation)`.
    pub fn decide(
        &self,
        product: &ProductInput,
        competitors: Vec<CompetitorPricing>,
    ) -> PipelineResult<PricingVerdict> {
        let mut gaps = GapLedger::new();
        for competitor in &competitors {
            gaps.extend(competitor.gaps().iter().cloned());
        }

        let comparable: Vec<&CompetitorPricing> =
            competitors.iter().filter(|c| c.is_comparable()).collect();
        let citations = citations_of(&comparable);
        let mut key_reasons: Vec<String> =
            comparable.iter().map(|c| competitor_reason(c)).collect();

        let verdict = if comparable.len() < MIN_COMPARABLE {
            let message = format!(
                "insufficient comparable competitors (found {}, need ≥{MIN_COMPARABLE})",
                comparable.len()
            );
            gaps.record(Gap::new(
                GapCode::InsufficientComparableCompetitors,
                message.clone(),
                EntityRef::Run,
            ));
            undeterminable(message, key_reasons, gaps, competitors, citations)
        } else {
            match self.product_monthly_usd(product) {
                Err(product_gaps) => {
                    gaps.extend(product_gaps);
                    let message = format!(
                        "current price {:?} could not be normalized",
                        product.current_price_text
                    );
                    undeterminable(message, key_reasons, gaps, competitors, citations)
                }
                Ok(price) => {
                    let values: Vec<f64> = comparable
                        .iter()
                        .filter_map(|c| c.normalized_monthly_usd())
                        .collect();
                    let snippet_count = comparable
                        .iter()
                        .map(|c| c.evidence_snippets().len())
                        .sum();
                    let distribution = Distribution::of(&values).ok_or_else(|| {
                        PipelineError::contract("comparable competitors without values")
                    })?;

                    let status = self.classify(price, distribution.median);
                    let raw = confidence_score(
                        values.len(),
                        distribution.cv(),
                        snippet_count,
                        !gaps.is_empty(),
                    );
                    let confidence = Confidence::from_level(ConfidenceLevel::from_raw(raw));

                    let diff_pct = (price - distribution.median) / distribution.median * 100.0;
                    key_reasons.insert(
                        0,
                        format!(
                            "product price ${price:.2}/month vs competitor median ${:.2}/month ({diff_pct:+.1}%)",
                            distribution.median
                        ),
                    );
                    key_reasons.insert(
                        1,
                        format!(
                            "fair band is ±{:.0}% of the median: ${:.2}-${:.2}/month",
                            self.config.fair_band_pct * 100.0,
                            distribution.median * (1.0 - self.config.fair_band_pct),
                            distribution.median * (1.0 + self.config.fair_band_pct),
                        ),
                    );
                    key_reasons.insert(
                        2,
                        format!(
                            "competitor range ${:.2}-${:.2}/month, mean ${:.2}/month across {} comparable competitors",
                            distribution.min,
                            distribution.max,
                            distribution.mean,
                            distribution.count
                        ),
                    );

                    let summary = format!(
                        "{status}: {} at ${price:.2}/month is {:.1}% {} the competitor median of ${:.2}/month ({} comparable competitors).",
                        product.name,
                        diff_pct.abs(),
                        if diff_pct < 0.0 { "below" } else { "above" },
                        distribution.median,
                        distribution.count,
                    );

                    PricingVerdict::new(
                        status,
                        confidence,
                        summary,
                        key_reasons,
                        gaps.as_slice().to_vec(),
                        competitors,
                        citations,
                    )
                }
            }
        };

        check_contract(&verdict)?;
        tracing::info!(
            status = verdict.status().as_str(),
            confidence = verdict.confidence().level.as_str(),
            comparable = verdict.comparable_count(),
            gaps = verdict.gaps().len(),
            "verdict computed"
        );
        Ok(verdict)
    }

    /// UNDERPRICED / FAIR / OVERPRICED against the band around `median`.
    pub fn classify(&self, price: f64, median: f64) -> VerdictStatus {
        let band = self.config.fair_band_pct;
        if price < median * (1.0 - band) {
            VerdictStatus::Underpriced
        } else if price > median * (1.0 + band) {
            VerdictStatus::Overpriced
        } else {
            VerdictStatus::Fair
        }
    }

    /// The product's own monthly USD price, or the gaps explaining why not.
    fn product_monthly_usd(&self, product: &ProductInput) -> Result<f64, Vec<Gap>> {
        let text = product.current_price_text.as_str();
        let not_normalizable = |cause: Gap| {
            vec![
                Gap::new(
                    GapCode::CurrentPriceNotNormalizable,
                    format!("current price {text:?} could not be normalized"),
                    EntityRef::Product,
                ),
                cause,
            ]
        };

        let parsed = parse_text(text)
            .map_err(|f| not_normalizable(f.to_gap(text, EntityRef::Product)))?;
        match normalize(&parsed, &self.fx) {
            NormalizationOutcome::Normalized(price) => Ok(price.monthly_usd()),
            NormalizationOutcome::Blocked(blocked) => {
                Err(not_normalizable(blocked.to_gap(text, EntityRef::Product)))
            }
        }
    }
}

fn undeterminable(
    reason: String,
    mut key_reasons: Vec<String>,
    gaps: GapLedger,
    competitors: Vec<CompetitorPricing>,
    citations: Vec<Citation>,
) -> PricingVerdict {
    let summary = format!("UNDETERMINABLE: {reason}.");
    key_reasons.insert(0, reason);
    PricingVerdict::new(
        VerdictStatus::Undeterminable,
        Confidence::from_level(ConfidenceLevel::Low),
        summary,
        key_reasons,
        gaps.as_slice().to_vec(),
        competitors,
        citations,
    )
}

/// Raw confidence in `[0, 1]` before bucketing.
///
/// `0.4·min(C/5,1) + 0.3·(1 − min(cv,1)) + 0.3·min(E/10,1) − 0.1·[gaps]`
pub fn confidence_score(comparable: usize, cv: f64, snippets: usize, has_gaps: bool) -> f64 {
    let coverage = (comparable as f64 / 5.0).min(1.0);
    let consistency = 1.0 - cv.min(1.0);
    let evidence = (snippets as f64 / 10.0).min(1.0);
    let penalty = if has_gaps { 0.1 } else { 0.0 };
    (0.4 * coverage + 0.3 * consistency + 0.3 * evidence - penalty).clamp(0.0, 1.0)
}

fn competitor_reason(competitor: &CompetitorPricing) -> String {
    let value = competitor.normalized_monthly_usd().unwrap_or_default();
    let (price_text, url) = competitor
        .normalized_snippet()
        .map(|s| (s.price_text(), s.source_url()))
        .unwrap_or(("", ""));
    format!(
        "{}: ${value:.2}/month from {price_text:?} ({url})",
        competitor.competitor_name()
    )
}

fn citations_of(comparable: &[&CompetitorPricing]) -> Vec<Citation> {
    let mut out = Vec::new();
    for competitor in comparable {
        for citation in competitor.citations() {
            push_unique(&mut out, citation.clone());
        }
    }
    out
}

/// Structural guarantees every emitted verdict must hold.
pub fn check_contract(verdict: &PricingVerdict) -> PipelineResult<()> {
    let mut domains: HashSet<&str> = HashSet::new();
    for competitor in verdict.competitor_table() {
        if !domains.insert(competitor.domain()) {
            return Err(PipelineError::contract(format!(
                "duplicate competitor domain {}",
                competitor.domain()
            )));
        }

        let Some(value) = competitor.normalized_monthly_usd() else {
            continue;
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(PipelineError::contract(format!(
                "{}: normalized value {value} is not a positive finite number",
                competitor.domain()
            )));
        }
        let Some(snippet) = competitor.normalized_snippet() else {
            return Err(PipelineError::contract(format!(
                "{}: normalized value without its evidence snippet",
                competitor.domain()
            )));
        };
        let cited =
            |citations: &[Citation]| citations.iter().any(|c| c.url == snippet.source_url());
        if !cited(competitor.citations()) || !cited(verdict.citations()) {
            return Err(PipelineError::contract(format!(
                "{}: normalized value without a citation for {}",
                competitor.domain(),
                snippet.source_url()
            )));
        }
    }
    Ok(())
}
