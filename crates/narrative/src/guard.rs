//! Number guard and the narration entry point.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use pricetruth_core::ProductInput;
use pricetruth_pricing::parse_amount;
use pricetruth_verdict::PricingVerdict;

use crate::narrative::{Narrative, NarrativeError};
use crate::narrator::Narrator;
use crate::request::NarrationRequest;

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]+)*").expect("number token pattern is valid"));

/// Whether the optional narrative stage runs. Passed explicitly per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationMode {
    #[default]
    Disabled,
    Enabled,
}

fn numbers_in(text: &str) -> impl Iterator<Item = (&str, f64)> + '_ {
    NUMBER_TOKEN.find_iter(text).filter_map(|m| {
        let token = m.as_str().trim_end_matches(['.', ',']);
        parse_amount(token).map(|value| (token, value))
    })
}

/// Number tokens in `text` whose value appears nowhere in `request`.
pub fn introduced_numbers(text: &str, request: &NarrationRequest<'_>) -> Vec<String> {
    let Ok(evidence) = request.to_json() else {
        return numbers_in(text).map(|(token, _)| token.to_string()).collect();
    };
    let known: Vec<f64> = numbers_in(&evidence).map(|(_, value)| value).collect();

    let mut out: Vec<String> = Vec::new();
    for (token, value) in numbers_in(text) {
        let present = known.iter().any(|k| (k - value).abs() < 1e-9);
        if !present && !out.iter().any(|t| t == token) {
            out.push(token.to_string());
        }
    }
    out
}

/// Validate a draft and label it non-authoritative.
pub fn check(
    narrator: &str,
    draft: String,
    request: &NarrationRequest<'_>,
) -> Result<Narrative, NarrativeError> {
    if draft.trim().is_empty() {
        return Err(NarrativeError::Empty);
    }
    let introduced = introduced_numbers(&draft, request);
    if !introduced.is_empty() {
        return Err(NarrativeError::IntroducedNumbers(introduced));
    }
    Ok(Narrative::new(narrator, draft))
}

/// Run the narrative stage on a finalized verdict.
///
/// Returns `None` when disabled or when the narrator's output is rejected; the
/// verdict itself is never affected.
pub fn narrate(
    mode: NarrationMode,
    narrator: &dyn Narrator,
    product: &ProductInput,
    verdict: &PricingVerdict,
) -> Option<Narrative> {
    if mode == NarrationMode::Disabled {
        return None;
    }
    let request = NarrationRequest::new(product, verdict);
    let result = narrator
        .narrate(&request)
        .and_then(|draft| check(narrator.name(), draft, &request));
    match result {
        Ok(narrative) => Some(narrative),
        Err(err) => {
            tracing::warn!(narrator = narrator.name(), error = %err, "narrative rejected");
            None
        }
    }
}
