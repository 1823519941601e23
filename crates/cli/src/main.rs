use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pricetruth_core::{CancellationFlag, PipelineError};
use pricetruth_narrative::{NarrationMode, TemplateNarrator, narrate};
use pricetruth_observability::LogFormat;
use pricetruth_pricing::{NormalizationOutcome, normalize, parse_text};
use pricetruth_report::{RunReport, render_json, write_reports};
use pricetruth_verdict::{EvidenceBundle, PipelineConfig, analyze_bundle};

#[derive(Parser)]
#[command(name = "pricetruth", author, version, about, long_about = None)]
struct Cli {
    /// Log output format (json or pretty); filtering follows RUST_LOG
    #[arg(long, global = true, default_value = "json", env = "PRICETRUTH_LOG_FORMAT")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a product's price against the competitor evidence in a bundle
    Analyze {
        /// Evidence bundle: {"product": {...}, "sources": [...]}
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Pipeline configuration (JSON); PRICETRUTH_* variables override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Write report.json and report.md here instead of printing JSON
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Add a non-authoritative narrative to the report
        #[arg(long)]
        narrate: bool,
    },
    /// Parse and normalize a single price text
    Parse {
        /// Price text, e.g. "$99/month"
        text: String,
        /// Pipeline configuration (JSON), for FX rates
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    pricetruth_observability::init_with(cli.log_format);

    match cli.command {
        Commands::Analyze {
            input,
            config,
            out_dir,
            narrate,
        } => run_analyze(&input, config.as_deref(), out_dir.as_deref(), narrate),
        Commands::Parse { text, config } => run_parse(&text, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PipelineConfig::from_json_str(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("applying PRICETRUTH_* environment overrides")?;
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn run_analyze(
    input: &Path,
    config: Option<&Path>,
    out_dir: Option<&Path>,
    narrate_flag: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading evidence bundle {}", input.display()))?;
    let bundle = EvidenceBundle::from_json_str(&json)
        .with_context(|| format!("parsing evidence bundle {}", input.display()))?;

    let cancel = CancellationFlag::new();
    let verdict = match analyze_bundle(&bundle, &config, &cancel) {
        Ok(verdict) => verdict,
        Err(PipelineError::Cancelled) => anyhow::bail!("analysis cancelled"),
        Err(err) => return Err(err).context("analysis failed"),
    };

    let mode = if narrate_flag {
        NarrationMode::Enabled
    } else {
        NarrationMode::Disabled
    };
    let narrative = narrate(mode, &TemplateNarrator, &bundle.product, &verdict);
    let report = RunReport::new(bundle.product.clone(), bundle.sources.len(), verdict)
        .with_narrative(narrative);

    match out_dir {
        Some(dir) => {
            let (json_path, md_path) = write_reports(&report, dir)
                .with_context(|| format!("writing reports to {}", dir.display()))?;
            println!("{}", report.verdict().summary());
            println!("{}", json_path.display());
            println!("{}", md_path.display());
        }
        None => println!("{}", render_json(&report)?),
    }
    Ok(())
}

fn run_parse(text: &str, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let output = match parse_text(text) {
        Err(failure) => serde_json::json!({
            "parsed": null,
            "gap": failure.to_gap(text, pricetruth_core::EntityRef::Product),
        }),
        Ok(parsed) => match normalize(&parsed, &config.fx_rates) {
            NormalizationOutcome::Normalized(price) => serde_json::json!({
                "parsed": parsed,
                "normalized_monthly_usd": price.monthly_usd(),
                "method": price.method(),
            }),
            NormalizationOutcome::Blocked(blocked) => serde_json::json!({
                "parsed": parsed,
                "normalized_monthly_usd": null,
                "gap": blocked.to_gap(text, pricetruth_core::EntityRef::Product),
            }),
        },
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
