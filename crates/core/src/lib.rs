//! `pricetruth-core` — schema and validation layer.
//!
//! Shared, **pure** building blocks for the evidence-to-verdict pipeline: run
//! inputs, gaps, citations and the run-stopping error taxonomy. No I/O.

pub mod cancel;
pub mod citation;
pub mod currency;
pub mod domain;
pub mod error;
pub mod gap;
pub mod id;
pub mod source;
pub mod value_object;

pub use cancel::CancellationFlag;
pub use citation::Citation;
pub use currency::{CURRENCY_SYMBOLS, Currency};
pub use domain::{is_http_url, normalize_domain};
pub use error::{PipelineError, PipelineResult};
pub use gap::{EntityRef, Gap, GapCode, GapLedger};
pub use id::RunId;
pub use source::{ProductInput, Source, validate_sources};
pub use value_object::{ValueObject, push_unique};
