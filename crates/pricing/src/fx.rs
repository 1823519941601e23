use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pricetruth_core::{Currency, PipelineError, PipelineResult};

/// Explicitly supplied FX rates, in USD per unit of currency.
///
/// Empty unless the caller provides rates. USD itself never needs an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FxTable(BTreeMap<Currency, f64>);

impl FxTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, currency: Currency, usd_per_unit: f64) -> Self {
        self.0.insert(currency, usd_per_unit);
        self
    }

    pub fn insert(&mut self, currency: Currency, usd_per_unit: f64) {
        self.0.insert(currency, usd_per_unit);
    }

    pub fn rate(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Usd => Some(1.0),
            other => self.0.get(&other).copied(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.0.iter().map(|(c, r)| (*c, *r))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        for (currency, rate) in self.iter() {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(PipelineError::validation(format!(
                    "fx_rates.{currency} must be finite and > 0 (got {rate})"
                )));
            }
        }
        Ok(())
    }
}
