//! `pricetruth-narrative`
//!
//! **Responsibility:** optional prose on top of a finalized verdict.
//!
//! This crate is **not** part of the deterministic core:
//! - It runs only after the verdict is computed and never changes it.
//! - Narrators are injected; the built-in one is template-based.
//! - Output is labeled non-authoritative and rejected if it introduces a
//!   number that the evidence does not contain.

pub mod guard;
pub mod narrative;
pub mod narrator;
pub mod request;

pub use guard::{NarrationMode, check, introduced_numbers, narrate};
pub use narrative::{NON_AUTHORITATIVE_LABEL, Narrative, NarrativeError};
pub use narrator::{Narrator, TemplateNarrator};
pub use request::NarrationRequest;
