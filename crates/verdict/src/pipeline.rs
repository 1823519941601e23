//! The evidence-to-verdict run.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pricetruth_core::{CancellationFlag, PipelineResult, ProductInput, Source, validate_sources};
use pricetruth_extraction::SnippetExtractor;

use crate::aggregate::{SourceEvidence, aggregate};
use crate::config::PipelineConfig;
use crate::engine::VerdictEngine;
use crate::verdict::PricingVerdict;

/// A product plus the sources retrieved for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub product: ProductInput,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl EvidenceBundle {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            pricetruth_core::PipelineError::validation(format!("invalid evidence bundle: {e}"))
        })
    }
}

/// Run the pipeline for one product.
///
/// Inputs are validated before any computation. Sources are processed in
/// parallel and merged by position, so identical input gives an identical
/// verdict. `cancel` is polled between stages and per source; a cancelled run
/// returns `Err(Cancelled)` and nothing else.
pub fn analyze(
    product: &ProductInput,
    sources: &[Source],
    config: &PipelineConfig,
    cancel: &CancellationFlag,
) -> PipelineResult<PricingVerdict> {
    config.validate()?;
    product.validate()?;
    validate_sources(sources)?;
    cancel.check()?;

    tracing::info!(product = %product.name, sources = sources.len(), "analysis started");

    let extractor = SnippetExtractor::new(config.extraction);
    let per_source = sources
        .par_iter()
        .enumerate()
        .map(|(position, source)| -> PipelineResult<SourceEvidence> {
            cancel.check()?;
            Ok(SourceEvidence::collect(
                position,
                source,
                &extractor,
                &config.fx_rates,
            ))
        })
        .collect::<PipelineResult<Vec<_>>>()?;
    cancel.check()?;

    let competitors = aggregate(product, per_source);
    cancel.check()?;

    let verdict = VerdictEngine::new(config.verdict, config.fx_rates.clone())
        .decide(product, competitors)?;
    cancel.check()?;

    Ok(verdict)
}

/// [`analyze`] over a bundle.
pub fn analyze_bundle(
    bundle: &EvidenceBundle,
    config: &PipelineConfig,
    cancel: &CancellationFlag,
) -> PipelineResult<PricingVerdict> {
    analyze(&bundle.product, &bundle.sources, config, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetruth_core::PipelineError;

    #[test]
    fn bundle_parses_from_json() {
        let bundle = EvidenceBundle::from_json_str(
            r#"{
                "product": {"name": "Acme", "url": "https://acme.com", "current_price_text": "$50/month"},
                "sources": [{"url": "https://a.com", "title": "A", "raw_content": "Pro $20/month"}]
            }"#,
        )
        .unwrap();
        assert_eq!(bundle.sources.len(), 1);
        assert_eq!(bundle.product.name, "Acme");
    }

    #[test]
    fn invalid_input_fails_before_work() {
        let product = ProductInput::new("", "https://acme.com", "$50/month");
        let err = analyze(&product, &[], &PipelineConfig::default(), &CancellationFlag::new())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn cancelled_runs_emit_nothing() {
        let product = ProductInput::new("Acme", "https://acme.com", "$50/month");
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = analyze(&product, &[], &PipelineConfig::default(), &cancel).unwrap_err();
        assert_eq!(err, PipelineError::Cancelled);
    }
}
