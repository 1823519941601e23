//! JSON and Markdown renderings of a [`RunReport`].
//!
//! Renderers format what the verdict already says; they never recompute a
//! number.

use std::path::{Path, PathBuf};

use thiserror::Error;

use pricetruth_verdict::CompetitorPricing;

use crate::report::RunReport;

pub const JSON_FILE: &str = "report.json";
pub const MARKDOWN_FILE: &str = "report.md";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn render_json(report: &RunReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_markdown(report: &RunReport) -> String {
    let verdict = report.verdict();
    let product = report.product();
    let mut md = Markdown::default();

    md.line("# Pricing Analysis Report");
    md.blank();
    md.line(&format!("**Generated:** {}", report.generated_at().to_rfc3339()));
    md.line(&format!("**Run:** `{}`", report.run_id()));
    md.blank();

    md.heading("Inputs");
    md.line(&format!("- **Product:** {}", product.name));
    md.line(&format!("- **URL:** {}", product.url));
    md.line(&format!("- **Current price:** {}", product.current_price_text));
    if let Some(model) = &product.pricing_model {
        md.line(&format!("- **Pricing model:** {model}"));
    }
    md.line(&format!("- **Sources retrieved:** {}", report.sources_retrieved()));
    md.line(&format!(
        "- **Competitors analyzed:** {} ({} comparable)",
        verdict.competitor_table().len(),
        verdict.comparable_count()
    ));
    for hint in &product.competitor_urls {
        md.line(&format!("- **Competitor hint:** {hint}"));
    }
    md.blank();

    md.heading("Verdict");
    md.line(&format!("**Status:** {}", verdict.status()));
    md.blank();
    let confidence = verdict.confidence();
    md.line(&format!(
        "**Confidence:** {} ({})",
        confidence.level.as_str(),
        confidence.score
    ));
    md.blank();
    md.line(verdict.summary());
    md.blank();

    md.heading("Competitor Comparison");
    if verdict.competitor_table().is_empty() {
        md.line("No competitors were found in the retrieved sources.");
    } else {
        md.line("| Competitor | Domain | Price evidence (verbatim) | Monthly USD | Notes |");
        md.line("|---|---|---|---|---|");
        for competitor in verdict.competitor_table() {
            md.line(&comparison_row(competitor));
        }
    }
    md.blank();

    md.heading("Key Reasons");
    bullets(&mut md, verdict.key_reasons().iter().map(String::as_str));

    md.heading("Gaps & Limitations");
    if verdict.gaps().is_empty() {
        md.line("No data gaps were recorded.");
        md.blank();
    } else {
        let gaps: Vec<String> = verdict
            .gaps()
            .iter()
            .map(|g| format!("`{}` {} ({})", g.reason_code, g.message, g.related_entity_ref))
            .collect();
        bullets(&mut md, gaps.iter().map(String::as_str));
    }

    md.heading("Citations");
    if verdict.citations().is_empty() {
        md.line("No numeric claims required citations.");
        md.blank();
    } else {
        for (i, citation) in verdict.citations().iter().enumerate() {
            let title = citation.title.as_deref().unwrap_or(&citation.url);
            let retrieved = citation
                .timestamp
                .map(|t| format!(", retrieved {}", t.to_rfc3339()))
                .unwrap_or_default();
            md.line(&format!("{}. [{}]({}){retrieved}", i + 1, escape(title), citation.url));
        }
        md.blank();
    }

    if let Some(narrative) = report.narrative() {
        md.heading("Narrative (non-authoritative)");
        md.line(&format!("> {}", narrative.label()));
        md.blank();
        md.line(narrative.text().trim_end());
        md.blank();
    }

    md.finish()
}

/// Write `report.json` and `report.md` into `dir`, creating it if needed.
pub fn write_reports(report: &RunReport, dir: &Path) -> Result<(PathBuf, PathBuf), ReportError> {
    let write = |name: &str, contents: String| -> Result<PathBuf, ReportError> {
        let path = dir.join(name);
        std::fs::write(&path, contents).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    };

    std::fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let json = write(JSON_FILE, render_json(report)?)?;
    let markdown = write(MARKDOWN_FILE, render_markdown(report))?;
    tracing::info!(json = %json.display(), markdown = %markdown.display(), "reports written");
    Ok((json, markdown))
}

fn comparison_row(competitor: &CompetitorPricing) -> String {
    let evidence = match competitor.normalized_snippet() {
        Some(snippet) => escape(snippet.text()),
        None if competitor.no_evidence_found() => "no evidence found".to_string(),
        None => competitor
            .extracted_price_texts()
            .first()
            .map(|t| escape(t))
            .unwrap_or_default(),
    };
    let monthly = competitor
        .normalized_monthly_usd()
        .map(|v| format!("${v:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    let notes = competitor
        .notes()
        .iter()
        .map(|n| escape(n))
        .chain(competitor.gaps().iter().map(|g| escape(&g.message)))
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "| {} | {} | {evidence} | {monthly} | {notes} |",
        escape(competitor.competitor_name()),
        competitor.domain()
    )
}

fn bullets<'a>(md: &mut Markdown, items: impl Iterator<Item = &'a str>) {
    let mut any = false;
    for item in items {
        md.line(&format!("- {item}"));
        any = true;
    }
    if !any {
        md.line("- (none)");
    }
    md.blank();
}

/// Keep table cells on one line and free of column breaks.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

#[derive(Default)]
struct Markdown(String);

impl Markdown {
    fn line(&mut self, s: &str) {
        self.0.push_str(s);
        self.0.push('\n');
    }

    fn blank(&mut self) {
        self.0.push('\n');
    }

    fn heading(&mut self, title: &str) {
        self.line(&format!("## {title}"));
        self.blank();
    }

    fn finish(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pricetruth_core::{CancellationFlag, ProductInput, RunId, Source};
    use pricetruth_narrative::{NarrationMode, TemplateNarrator, narrate};
    use pricetruth_verdict::{PipelineConfig, analyze};
    use uuid::Uuid;

    fn report(narrated: bool) -> RunReport {
        let product = ProductInput::new("Acme", "https://acme.com", "$50/month");
        let sources = vec![
            Source::new("https://a.com/pricing", "A | Pricing", "Pro $20/month"),
            Source::new("https://b.com/pricing", "B Pricing", "Pro $30/month"),
            Source::new("https://c.com/pricing", "C Pricing", "Team $10/seat/month"),
        ];
        let verdict =
            analyze(&product, &sources, &PipelineConfig::default(), &CancellationFlag::new())
                .unwrap();
        let mode = if narrated {
            NarrationMode::Enabled
        } else {
            NarrationMode::Disabled
        };
        let narrative = narrate(mode, &TemplateNarrator, &product, &verdict);
        RunReport::new(product, sources.len(), verdict)
            .with_narrative(narrative)
            .with_run_id(RunId::from_uuid(Uuid::nil()))
            .with_generated_at(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn json_wraps_the_verdict_with_metadata() {
        let rendered = render_json(&report(false)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["schema_version"], "1.0");
        assert_eq!(json["run_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["verdict"]["status"], "OVERPRICED");
        assert!(json.get("narrative").is_none());
    }

    #[test]
    fn markdown_has_every_section_in_order() {
        let md = render_markdown(&report(true));
        let sections = [
            "## Inputs",
            "## Verdict",
            "## Competitor Comparison",
            "## Key Reasons",
            "## Gaps & Limitations",
            "## Citations",
            "## Narrative (non-authoritative)",
        ];
        let mut last = 0;
        for section in sections {
            let at = md.find(section).unwrap_or_else(|| panic!("missing {section}"));
            assert!(at >= last, "{section} out of order");
            last = at;
        }
    }

    #[test]
    fn markdown_quotes_values_from_the_verdict() {
        let report = report(false);
        let md = render_markdown(&report);
        assert!(md.contains("**Status:** OVERPRICED"));
        assert!(md.contains("| $20.00 |"));
        assert!(md.contains("| n/a |"));
        assert!(md.contains("per-seat pricing without seat count"));
        assert!(md.contains("[A \\| Pricing](https://a.com/pricing)"));
        assert!(!md.contains("## Narrative"));
    }
}
