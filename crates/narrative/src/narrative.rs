use serde::Serialize;
use thiserror::Error;

/// Label attached to every narrative.
pub const NON_AUTHORITATIVE_LABEL: &str =
    "Narrative (non-authoritative): restates the computed verdict; the verdict fields are the source of truth.";

/// Prose accompanying a verdict.
///
/// This is *not* part of the verdict. It is only ever created by
/// [`crate::guard::check`], after its numbers were matched against the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    narrator: String,
    label: &'static str,
    authoritative: bool,
    text: String,
}

impl Narrative {
    pub(crate) fn new(narrator: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            narrator: narrator.into(),
            label: NON_AUTHORITATIVE_LABEL,
            authoritative: false,
            text: text.into(),
        }
    }

    pub fn narrator(&self) -> &str {
        &self.narrator
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("narrative is empty")]
    Empty,

    #[error("narrative introduces numbers absent from the evidence: {}", .0.join(", "))]
    IntroducedNumbers(Vec<String>),
}
