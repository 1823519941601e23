use serde::Serialize;

use pricetruth_core::{Gap, ProductInput};
use pricetruth_verdict::PricingVerdict;

/// Everything a narrator may talk about: the product input and the finalized
/// verdict with its evidence and gaps. Nothing else.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NarrationRequest<'a> {
    pub product: &'a ProductInput,
    pub verdict: &'a PricingVerdict,
}

impl<'a> NarrationRequest<'a> {
    pub fn new(product: &'a ProductInput, verdict: &'a PricingVerdict) -> Self {
        Self { product, verdict }
    }

    pub fn gaps(&self) -> &'a [Gap] {
        self.verdict.gaps()
    }

    /// The request as JSON, the form external narrators receive.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
