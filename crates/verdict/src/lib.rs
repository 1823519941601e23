//! `pricetruth-verdict`
//!
//! **Responsibility:** the deterministic core run, from retrieved sources to
//! a [`PricingVerdict`].
//!
//! - Per-source work (extract, parse, normalize) runs in parallel.
//! - Aggregation is the barrier; it merges by source position.
//! - The verdict engine never emits a number it cannot cite.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod stats;
pub mod verdict;

pub use aggregate::{CompetitorPricing, PriceEvidence, SourceEvidence, aggregate};
pub use config::{PipelineConfig, VerdictConfig};
pub use engine::{MIN_COMPARABLE, VerdictEngine, check_contract, confidence_score};
pub use pipeline::{EvidenceBundle, analyze, analyze_bundle};
pub use stats::Distribution;
pub use verdict::{Confidence, ConfidenceLevel, PricingVerdict, VerdictStatus};
