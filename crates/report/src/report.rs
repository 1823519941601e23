use chrono::{DateTime, Utc};
use serde::Serialize;

use pricetruth_core::{ProductInput, RunId};
use pricetruth_narrative::Narrative;
use pricetruth_verdict::PricingVerdict;

pub const SCHEMA_VERSION: &str = "1.0";

/// A verdict wrapped with run metadata. Renderers only read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    schema_version: &'static str,
    run_id: RunId,
    generated_at: DateTime<Utc>,
    product: ProductInput,
    sources_retrieved: usize,
    verdict: PricingVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    narrative: Option<Narrative>,
}

impl RunReport {
    pub fn new(product: ProductInput, sources_retrieved: usize, verdict: PricingVerdict) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: RunId::new(),
            generated_at: Utc::now(),
            product,
            sources_retrieved,
            verdict,
            narrative: None,
        }
    }

    pub fn with_narrative(mut self, narrative: Option<Narrative>) -> Self {
        self.narrative = narrative;
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn schema_version(&self) -> &str {
        self.schema_version
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn product(&self) -> &ProductInput {
        &self.product
    }

    pub fn sources_retrieved(&self) -> usize {
        self.sources_retrieved
    }

    pub fn verdict(&self) -> &PricingVerdict {
        &self.verdict
    }

    pub fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }
}
