use crate::narrative::NarrativeError;
use crate::request::NarrationRequest;

/// An injectable narration capability.
///
/// Implementations receive the finalized verdict and return draft prose. They
/// never see or change how the verdict was computed; drafts are checked by
/// [`crate::guard::check`] before anyone reads them.
pub trait Narrator: Send + Sync {
    /// Short identifier recorded on the narrative.
    fn name(&self) -> &str;

    fn narrate(&self, request: &NarrationRequest<'_>) -> Result<String, NarrativeError>;
}

/// Deterministic narrator that only rearranges text already in the verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    /// Gaps quoted at most in the caveats paragraph.
    const MAX_CAVEATS: usize = 3;
}

impl Narrator for TemplateNarrator {
    fn name(&self) -> &str {
        "template"
    }

    fn narrate(&self, request: &NarrationRequest<'_>) -> Result<String, NarrativeError> {
        let verdict = request.verdict;
        let mut out = String::new();

        out.push_str(verdict.summary());
        out.push('\n');

        if !verdict.key_reasons().is_empty() {
            out.push_str("\nWhat the evidence shows:\n");
            for reason in verdict.key_reasons() {
                out.push_str("- ");
                out.push_str(reason);
                out.push('\n');
            }
        }

        out.push_str("\nCaveats:\n");
        if request.gaps().is_empty() {
            out.push_str("- No data gaps were recorded for this run.\n");
        } else {
            for gap in request.gaps().iter().take(Self::MAX_CAVEATS) {
                out.push_str("- ");
                out.push_str(&gap.message);
                out.push('\n');
            }
            if request.gaps().len() > Self::MAX_CAVEATS {
                out.push_str("- Further gaps are listed in the report.\n");
            }
        }

        Ok(out)
    }
}
