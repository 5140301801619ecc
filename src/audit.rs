// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit pipeline: render, run the WCAG rules, ask the reviewer.
//!
//! A renderer failure fails the whole audit. A reviewer failure only
//! costs the heuristic findings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyzers::wcag_checks;
use crate::error::Result;
use crate::export::ExportSink;
use crate::finding::{FindingKind, FindingSet};
use crate::heuristics::HeuristicReviewer;
use crate::render::PageRenderer;

/// Findings and screenshot for one audited URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub id: Uuid,
    pub url: String,
    pub audited_at: DateTime<Utc>,
    /// WCAG findings first, then heuristic findings
    pub findings: FindingSet,
    /// Raw screenshot; not part of the JSON report
    #[serde(skip)]
    pub screenshot: Vec<u8>,
}

impl AuditResult {
    pub fn new(url: &str, findings: FindingSet, screenshot: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.to_string(),
            audited_at: Utc::now(),
            findings,
            screenshot,
        }
    }

    /// Read a result previously written as a JSON report
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Audit `url`. Without a reviewer only the WCAG rules run.
pub async fn run_audit(
    url: &str,
    renderer: &dyn PageRenderer,
    reviewer: Option<&dyn HeuristicReviewer>,
) -> Result<AuditResult> {
    let parsed = url::Url::parse(url)?;
    info!("Auditing {}", parsed);

    let capture = renderer.render(parsed.as_str()).await?;

    let mut findings = FindingSet::new();
    findings.extend(wcag_checks(
        &capture.html,
        &capture.img_positions,
        &capture.contrast_positions,
    ));

    if let Some(reviewer) = reviewer {
        match reviewer.review(&capture.html, url).await {
            Ok(heuristics) => findings.extend(heuristics),
            Err(e) => warn!("Heuristic review failed, continuing without it: {}", e),
        }
    }

    info!(
        "Audit of {} complete: {} WCAG, {} heuristic finding(s)",
        url,
        findings.by_kind(FindingKind::Wcag).len(),
        findings.by_kind(FindingKind::Heuristic).len()
    );

    Ok(AuditResult::new(url, findings, capture.screenshot))
}

/// Outcome of one sink in `export_all`
#[derive(Debug)]
pub struct ExportOutcome {
    pub sink: String,
    pub result: Result<()>,
}

/// Export to every sink in turn; one failure does not stop the rest
pub async fn export_all(result: &AuditResult, sinks: &[Box<dyn ExportSink>]) -> Vec<ExportOutcome> {
    let mut outcomes = Vec::with_capacity(sinks.len());
    for sink in sinks {
        info!("Exporting {} finding(s) to {}", result.findings.len(), sink.name());
        let outcome = sink.export(result.findings.as_slice()).await;
        if let Err(ref e) = outcome {
            warn!("Export to {} failed: {}", sink.name(), e);
        }
        outcomes.push(ExportOutcome {
            sink: sink.name().to_string(),
            result: outcome,
        });
    }
    outcomes
}
