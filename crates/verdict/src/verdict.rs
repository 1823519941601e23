//! The terminal artifact of a run.

use serde::{Deserialize, Serialize};

use pricetruth_core::{Citation, Gap};

use crate::aggregate::CompetitorPricing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Underpriced,
    Fair,
    Overpriced,
    Undeterminable,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Underpriced => "UNDERPRICED",
            VerdictStatus::Fair => "FAIR",
            VerdictStatus::Overpriced => "OVERPRICED",
            VerdictStatus::Undeterminable => "UNDETERMINABLE",
        }
    }
}

impl core::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Fixed numeric equivalent used by renderers.
    pub fn score(&self) -> f64 {
        match self {
            ConfidenceLevel::High => 0.9,
            ConfidenceLevel::Medium => 0.6,
            ConfidenceLevel::Low => 0.3,
        }
    }

    /// Bucket a raw `[0, 1]` score.
    pub fn from_raw(raw: f64) -> Self {
        if raw >= 0.7 {
            ConfidenceLevel::High
        } else if raw >= 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    pub score: f64,
}

impl Confidence {
    pub fn from_level(level: ConfidenceLevel) -> Self {
        Self {
            level,
            score: level.score(),
        }
    }
}

/// Field names are a stable contract with the report renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingVerdict {
    status: VerdictStatus,
    confidence: Confidence,
    summary: String,
    key_reasons: Vec<String>,
    gaps: Vec<Gap>,
    competitor_table: Vec<CompetitorPricing>,
    citations: Vec<Citation>,
}

impl PricingVerdict {
    pub(crate) fn new(
        status: VerdictStatus,
        confidence: Confidence,
        summary: String,
        key_reasons: Vec<String>,
        gaps: Vec<Gap>,
        competitor_table: Vec<CompetitorPricing>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            status,
            confidence,
            summary,
            key_reasons,
            gaps,
            competitor_table,
            citations,
        }
    }

    pub fn status(&self) -> VerdictStatus {
        self.status
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn key_reasons(&self) -> &[String] {
        &self.key_reasons
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn competitor_table(&self) -> &[CompetitorPricing] {
        &self.competitor_table
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn comparable_count(&self) -> usize {
        self.competitor_table
            .iter()
            .filter(|c| c.is_comparable())
            .count()
    }
}
