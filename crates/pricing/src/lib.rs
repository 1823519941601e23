//! `pricetruth-pricing`
//!
//! **Responsibility:** turn evidence snippets into prices, and prices into
//! comparable monthly USD values.
//!
//! - Parsing reads exactly one money expression per snippet.
//! - Normalization only happens when cadence, currency and seats are all
//!   known; otherwise it is blocked and the reason is reported as a gap.
//! - FX rates are never inferred.

pub mod amount;
pub mod fx;
pub mod normalize;
pub mod parse;

pub use amount::parse_amount;
pub use fx::FxTable;
pub use normalize::{
    NormalizationBlocked, NormalizationOutcome, NormalizationStep, NormalizedPrice, normalize,
};
pub use parse::{Cadence, ParseFailure, ParsedPrice, PriceOrigin, parse_snippet, parse_text};
