// SPDX-License-Identifier: PMPL-1.0-or-later
//! Usabilitybot CLI - Web Usability & Accessibility Auditor
//!
//! Part of the gitbot-fleet ecosystem.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use usabilitybot::annotate::{annotate_screenshot, encode_png};
use usabilitybot::audit::{export_all, run_audit, AuditResult};
use usabilitybot::export::{ExportSink, NotionExporter, SheetsExporter};
use usabilitybot::heuristics::{HeuristicReviewer, OpenAiReviewer};
use usabilitybot::render::WebDriverRenderer;
use usabilitybot::report::{generate_report, OutputFormat};
use usabilitybot::Config;

/// Web usability and accessibility auditor for gitbot-fleet
#[derive(Parser)]
#[command(name = "usabilitybot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "usabilitybot.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a live page
    Audit {
        /// Page URL
        url: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Report file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the raw screenshot here
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Write the annotated screenshot (PNG) here
        #[arg(long)]
        annotated: Option<PathBuf>,

        /// Skip the language-model heuristic review
        #[arg(long)]
        no_heuristics: bool,

        /// Export findings to Google Sheets
        #[arg(long)]
        export_sheets: bool,

        /// Export findings to Notion
        #[arg(long)]
        export_notion: bool,
    },

    /// Outline the findings of a saved JSON report on a screenshot
    Annotate {
        /// Screenshot captured during the audit
        screenshot: PathBuf,

        /// JSON report written by `audit --format json`
        report: PathBuf,

        /// Annotated PNG to write
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Export the findings of a saved JSON report
    Export {
        /// JSON report written by `audit --format json`
        report: PathBuf,

        /// Export to Google Sheets
        #[arg(long)]
        sheets: bool,

        /// Export to Notion
        #[arg(long)]
        notion: bool,
    },
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "usabilitybot=debug"
    } else {
        "usabilitybot=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Audit {
            url,
            format,
            output,
            screenshot,
            annotated,
            no_heuristics,
            export_sheets,
            export_notion,
        } => {
            let renderer = WebDriverRenderer::new(&config.webdriver)?;
            let reviewer = build_reviewer(&config, no_heuristics)?;

            let result = run_audit(&url, &renderer, reviewer.as_deref())
                .await
                .with_context(|| format!("audit of {} failed", url))?;

            let report = generate_report(&result, format.into());
            write_output(&report, output.as_deref())?;

            if let Some(path) = screenshot {
                std::fs::write(&path, &result.screenshot)?;
                eprintln!("Screenshot written to {}", path.display());
            }

            if let Some(path) = annotated {
                let image = annotate_screenshot(&result.screenshot, result.findings.as_slice())?;
                std::fs::write(&path, encode_png(&image)?)?;
                eprintln!("Annotated screenshot written to {}", path.display());
            }

            let sinks = build_sinks(&config, export_sheets, export_notion)?;
            let export_failed = run_exports(&result, &sinks).await;

            if result.findings.has_critical() || export_failed {
                std::process::exit(1);
            }
        }

        Commands::Annotate { screenshot, report, output } => {
            let result = read_report(&report)?;
            let bytes = std::fs::read(&screenshot)
                .with_context(|| format!("reading {}", screenshot.display()))?;
            let image = annotate_screenshot(&bytes, result.findings.as_slice())?;
            std::fs::write(&output, encode_png(&image)?)?;
            eprintln!(
                "Outlined {} finding(s) in {}",
                result.findings.located().len(),
                output.display()
            );
        }

        Commands::Export { report, sheets, notion } => {
            if !sheets && !notion {
                anyhow::bail!("nothing to do: pass --sheets and/or --notion");
            }
            let result = read_report(&report)?;
            let sinks = build_sinks(&config, sheets, notion)?;
            if run_exports(&result, &sinks).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn build_reviewer(
    config: &Config,
    disabled: bool,
) -> anyhow::Result<Option<Box<dyn HeuristicReviewer>>> {
    if disabled || !config.reviewer.enabled {
        return Ok(None);
    }
    if config.reviewer.api_key.is_none() {
        tracing::warn!("No reviewer API key configured; skipping heuristic review");
        return Ok(None);
    }
    Ok(Some(Box::new(OpenAiReviewer::new(&config.reviewer)?)))
}

fn build_sinks(config: &Config, sheets: bool, notion: bool) -> anyhow::Result<Vec<Box<dyn ExportSink>>> {
    let mut sinks: Vec<Box<dyn ExportSink>> = Vec::new();
    if sheets {
        let sheets = config
            .sheets
            .as_ref()
            .context("[sheets] section missing from configuration")?;
        sinks.push(Box::new(SheetsExporter::new(sheets)?));
    }
    if notion {
        let notion = config
            .notion
            .as_ref()
            .context("[notion] section missing from configuration")?;
        sinks.push(Box::new(NotionExporter::new(notion)));
    }
    Ok(sinks)
}

/// Run every sink; true if any failed
async fn run_exports(result: &AuditResult, sinks: &[Box<dyn ExportSink>]) -> bool {
    let mut failed = false;
    for outcome in export_all(result, sinks).await {
        match outcome.result {
            Ok(()) => eprintln!("Exported to {}", outcome.sink),
            Err(e) => {
                eprintln!("Export to {} failed: {}", outcome.sink, e);
                failed = true;
            }
        }
    }
    failed
}

fn read_report(path: &Path) -> anyhow::Result<AuditResult> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    AuditResult::from_json(&json).with_context(|| format!("{} is not a JSON audit report", path.display()))
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
