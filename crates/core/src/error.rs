//! Pipeline error model.

use thiserror::Error;

/// Result type used across the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Run-stopping failure.
///
/// Only conditions that must abort a run live here. Unparseable prices, blocked
/// normalizations and thin evidence are data problems: they are recorded as
/// [`Gap`](crate::Gap)s and never surface as a `PipelineError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Malformed or missing required input. Raised before any computation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An internal guarantee was broken (e.g. a normalized value without a
    /// citation). Indicates a bug, not bad data.
    #[error("contract violated: {0}")]
    ContractViolation(String),

    /// The run was cancelled before a verdict was emitted.
    #[error("run cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
