//! Gaps: user-visible records of missing or ambiguous data.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Machine-readable reason a gap was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCode {
    // Parse failures.
    NoAmount,
    UnresolvableCurrency,
    ConflictingCadence,
    UnsupportedCadence,
    ZeroAmount,
    // Normalization blocks.
    AmbiguousCadence,
    PerSeatWithoutSeatCount,
    MissingFxRate,
    // Aggregation.
    NoEvidenceFound,
    // Verdict.
    InsufficientComparableCompetitors,
    CurrentPriceNotNormalizable,
}

impl GapCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapCode::NoAmount => "no_amount",
            GapCode::UnresolvableCurrency => "unresolvable_currency",
            GapCode::ConflictingCadence => "conflicting_cadence",
            GapCode::UnsupportedCadence => "unsupported_cadence",
            GapCode::ZeroAmount => "zero_amount",
            GapCode::AmbiguousCadence => "ambiguous_cadence",
            GapCode::PerSeatWithoutSeatCount => "per_seat_without_seat_count",
            GapCode::MissingFxRate => "missing_fx_rate",
            GapCode::NoEvidenceFound => "no_evidence_found",
            GapCode::InsufficientComparableCompetitors => "insufficient_comparable_competitors",
            GapCode::CurrentPriceNotNormalizable => "current_price_not_normalizable",
        }
    }
}

impl core::fmt::Display for GapCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a gap is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRef {
    /// The product's own price.
    Product,
    /// A competitor record, by normalized domain.
    Competitor { domain: String },
    /// A single evidence snippet.
    Snippet { source_url: String, char_offset: usize },
    /// The run as a whole.
    Run,
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityRef::Product => f.write_str("product"),
            EntityRef::Competitor { domain } => write!(f, "competitor:{domain}"),
            EntityRef::Snippet {
                source_url,
                char_offset,
            } => write!(f, "snippet:{source_url}@{char_offset}"),
            EntityRef::Run => f.write_str("run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub reason_code: GapCode,
    pub message: String,
    pub related_entity_ref: EntityRef,
}

impl ValueObject for Gap {}

impl Gap {
    pub fn new(
        reason_code: GapCode,
        message: impl Into<String>,
        related_entity_ref: EntityRef,
    ) -> Self {
        Self {
            reason_code,
            message: message.into(),
            related_entity_ref,
        }
    }

    /// Same gap, re-pointed at a different entity.
    pub fn about(mut self, entity: EntityRef) -> Self {
        self.related_entity_ref = entity;
        self
    }
}

impl core::fmt::Display for Gap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.reason_code, self.message, self.related_entity_ref
        )
    }
}

/// Append-only gap collection: gaps can be recorded, never removed or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapLedger(Vec<Gap>);

impl GapLedger {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn record(&mut self, gap: Gap) {
        tracing::debug!(
            code = gap.reason_code.as_str(),
            entity = %gap.related_entity_ref,
            "gap recorded"
        );
        self.0.push(gap);
    }

    pub fn extend<I: IntoIterator<Item = Gap>>(&mut self, gaps: I) {
        for gap in gaps {
            self.record(gap);
        }
    }

    pub fn as_slice(&self) -> &[Gap] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_code(&self, code: GapCode) -> bool {
        self.0.iter().any(|g| g.reason_code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gap> {
        self.0.iter()
    }
}

impl From<Vec<Gap>> for GapLedger {
    fn from(value: Vec<Gap>) -> Self {
        Self(value)
    }
}
