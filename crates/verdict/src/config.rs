//! Run configuration: file defaults, then environment overrides.

use serde::{Deserialize, Serialize};

use pricetruth_core::{Currency, PipelineError, PipelineResult};
use pricetruth_extraction::ExtractionConfig;
use pricetruth_pricing::FxTable;

pub const ENV_FAIR_BAND_PCT: &str = "PRICETRUTH_FAIR_BAND_PCT";
pub const ENV_MAX_SNIPPET_CHARS: &str = "PRICETRUTH_MAX_SNIPPET_CHARS";
/// Prefix for per-currency FX overrides, e.g. `PRICETRUTH_FX_EUR=1.08`.
pub const ENV_FX_PREFIX: &str = "PRICETRUTH_FX_";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    /// Fractional distance from the competitor median that still counts as
    /// FAIR (0.20 means ±20%).
    pub fair_band_pct: f64,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self { fair_band_pct: 0.20 }
    }
}

impl VerdictConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        let band = self.fair_band_pct;
        if !band.is_finite() || band <= 0.0 || band >= 1.0 {
            return Err(PipelineError::validation(format!(
                "verdict.fair_band_pct must be in (0, 1) (got {})",
                self.fair_band_pct
            )));
        }
        Ok(())
    }
}

/// Everything that shapes a run. Passed explicitly into [`crate::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub fx_rates: FxTable,
    pub verdict: VerdictConfig,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::validation(format!("invalid config: {e}")))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> PipelineResult<Self> {
        self.with_overrides(std::env::vars())
    }

    /// Apply `PRICETRUTH_*` overrides from `vars`; other keys are ignored.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> PipelineResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if key == ENV_FAIR_BAND_PCT {
                self.verdict.fair_band_pct = parse_env(key, value)?;
            } else if key == ENV_MAX_SNIPPET_CHARS {
                self.extraction.max_snippet_chars = parse_env(key, value)?;
            } else if let Some(code) = key.strip_prefix(ENV_FX_PREFIX) {
                let currency: Currency = code.parse()?;
                self.fx_rates.insert(currency, parse_env(key, value)?);
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.extraction.validate()?;
        self.fx_rates.validate()?;
        self.verdict.validate()
    }
}

fn parse_env<T: core::str::FromStr>(key: &str, value: &str) -> PipelineResult<T>
where
    T::Err: core::fmt::Display,
{
    value
        .parse()
        .map_err(|e| PipelineError::validation(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.verdict.fair_band_pct, 0.20);
        assert_eq!(config.extraction.max_snippet_chars, 280);
        assert!(config.fx_rates.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(r#"{"fx_rates": {"EUR": 1.08}}"#).unwrap();
        assert_eq!(config.fx_rates.rate(Currency::Eur), Some(1.08));
        assert_eq!(config.verdict, VerdictConfig::default());
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = PipelineConfig::from_json_str("{not json").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn env_overrides_apply() {
        let config = PipelineConfig::default()
            .with_overrides([
                ("PRICETRUTH_FAIR_BAND_PCT", "0.1"),
                ("PRICETRUTH_MAX_SNIPPET_CHARS", "120"),
                ("PRICETRUTH_FX_gbp", "1.27"),
                ("HOME", "/root"),
            ])
            .unwrap();
        assert_eq!(config.verdict.fair_band_pct, 0.1);
        assert_eq!(config.extraction.max_snippet_chars, 120);
        assert_eq!(config.fx_rates.rate(Currency::Gbp), Some(1.27));
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let err = PipelineConfig::default()
            .with_overrides([("PRICETRUTH_FAIR_BAND_PCT", "wide")])
            .unwrap_err();
        assert!(err.is_validation());

        let err = PipelineConfig::default()
            .with_overrides([("PRICETRUTH_FX_XYZ", "1.0")])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validate_rejects_out_of_range_band() {
        let mut config = PipelineConfig::default();
        config.verdict.fair_band_pct = 1.5;
        assert!(config.validate().unwrap_err().is_validation());
        config.verdict.fair_band_pct = f64::NAN;
        assert!(config.validate().unwrap_err().is_validation());
    }
}
