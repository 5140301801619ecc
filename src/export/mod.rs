// SPDX-License-Identifier: PMPL-1.0-or-later
//! Export sinks for audit findings.
//!
//! A failed export never touches the findings themselves; the caller can
//! retry or try another sink with the same result.

pub mod google_auth;
pub mod notion;
pub mod sheets;

pub use notion::NotionExporter;
pub use sheets::SheetsExporter;

use crate::error::{Error, Result};
use crate::finding::Finding;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Column order shared by every tabular export
pub const EXPORT_HEADERS: [&str; 5] = ["type", "rule", "severity", "element", "suggestion"];

/// Destination for a finished audit's findings
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    async fn export(&self, findings: &[Finding]) -> Result<()>;
}

/// One finding as a row matching `EXPORT_HEADERS`
pub fn finding_row(finding: &Finding) -> Vec<Value> {
    vec![
        json!(finding.kind.to_string()),
        json!(finding.rule),
        json!(finding.severity.value()),
        json!(finding.element),
        json!(finding.suggestion),
    ]
}

/// Turn a non-success response into an export error carrying its body
pub(crate) async fn check_status(sink: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::export(sink, format!("API returned {}: {}", status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    #[test]
    fn test_finding_row_order() {
        let finding = Finding::wcag("Images must have alt text", Severity::MAJOR)
            .with_element("<img src=\"a.png\">")
            .with_suggestion("Add descriptive alt text to this image.");
        let row = finding_row(&finding);
        assert_eq!(row.len(), EXPORT_HEADERS.len());
        assert_eq!(row[0], "WCAG");
        assert_eq!(row[1], "Images must have alt text");
        assert_eq!(row[2], 3);
        assert_eq!(row[3], "<img src=\"a.png\">");
        assert_eq!(row[4], "Add descriptive alt text to this image.");
    }
}
