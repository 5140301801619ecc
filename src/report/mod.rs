// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit results.
//!
//! Supports multiple output formats:
//! - Text: human-readable findings grouped by severity
//! - JSON: the audit result, readable back by `annotate` and `export`
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use crate::analyzers::{alt_text, contrast};
use crate::audit::AuditResult;
use crate::finding::{Finding, FindingKind, Severity};
use crate::heuristics::NIELSEN_HEURISTICS;
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report from an audit result
pub fn generate_report(result: &AuditResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(result),
        OutputFormat::Json => generate_json_report(result),
        OutputFormat::Sarif => generate_sarif_report(result),
    }
}

fn generate_text_report(result: &AuditResult) -> String {
    let findings = &result.findings;
    let mut output = String::new();

    output.push_str("=== Usabilitybot Audit Report ===\n");
    output.push_str(&format!("URL: {}\n", result.url));
    output.push_str(&format!("Audited: {}\n\n", result.audited_at.to_rfc3339()));

    if findings.is_empty() {
        output.push_str("No usability or accessibility issues found.\n");
        return output;
    }

    output.push_str(&format!(
        "Found {} finding(s): {} WCAG, {} heuristic\n\n",
        findings.len(),
        findings.by_kind(FindingKind::Wcag).len(),
        findings.by_kind(FindingKind::Heuristic).len()
    ));

    for severity in Severity::ALL {
        let sev_findings = findings.by_severity(severity);
        if sev_findings.is_empty() {
            continue;
        }

        output.push_str(&format!(
            "--- {} (severity {}, {}) ---\n",
            severity.label(),
            severity,
            sev_findings.len()
        ));

        for finding in sev_findings {
            output.push_str(&format!("[{}] {}\n", finding.kind, finding.rule));

            if !finding.element.is_empty() {
                output.push_str(&format!("  Element: {}\n", finding.element));
            }

            if !finding.suggestion.is_empty() {
                output.push_str(&format!("  Fix: {}\n", finding.suggestion));
            }

            if let Some(ref bbox) = finding.bbox {
                output.push_str(&format!(
                    "  Box: {:.0},{:.0} {:.0}x{:.0}\n",
                    bbox.x, bbox.y, bbox.width, bbox.height
                ));
            }

            output.push('\n');
        }
    }

    if findings.has_critical() {
        output.push_str("RESULT: CRITICAL ISSUES FOUND\n");
    } else if findings.iter().any(|f| f.severity >= Severity::MINOR) {
        output.push_str("RESULT: ISSUES FOUND\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}

fn generate_json_report(result: &AuditResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize audit result: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
    #[serde(rename = "informationUri")]
    information_uri: String,
}

#[derive(Debug, Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity.value() {
        4 | 3 => "error",
        2 => "warning",
        _ => "note",
    }
}

/// Short stable id: `wcag-<criterion>` or `heuristic-<n>` (1-based)
fn sarif_rule_id(finding: &Finding) -> String {
    match finding.kind {
        FindingKind::Wcag => {
            let criterion = match finding.rule.as_str() {
                alt_text::RULE => Some(alt_text::CRITERION),
                contrast::RULE => Some(contrast::CRITERION),
                _ => None,
            };
            criterion.map_or_else(|| "wcag".to_string(), |c| format!("wcag-{}", c))
        }
        FindingKind::Heuristic => NIELSEN_HEURISTICS
            .iter()
            .position(|h| h.eq_ignore_ascii_case(finding.rule.trim()))
            .map_or_else(|| "heuristic".to_string(), |i| format!("heuristic-{}", i + 1)),
    }
}

fn generate_sarif_report(result: &AuditResult) -> String {
    let results: Vec<SarifResult> = result
        .findings
        .iter()
        .map(|f| {
            let mut text = f.rule.clone();
            if !f.element.is_empty() {
                text.push_str(&format!(" ({})", f.element));
            }
            if !f.suggestion.is_empty() {
                text.push_str(&format!(": {}", f.suggestion));
            }

            SarifResult {
                rule_id: sarif_rule_id(f),
                level: sarif_level(f.severity).to_string(),
                message: SarifMessage { text },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: result.url.clone(),
                        },
                    },
                }],
            }
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "usabilitybot".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/gitbot-fleet".to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{FindingSet, Rect};

    fn sample_result() -> AuditResult {
        let mut findings = FindingSet::new();
        findings.add(
            Finding::wcag("Text must have sufficient color contrast", Severity::CRITICAL)
                .with_element("color: #aaa, background: #ccc")
                .with_suggestion("Increase contrast")
                .with_bbox(Some(Rect::new(10.0, 10.0, 50.0, 20.0))),
        );
        findings.add(Finding::heuristic("Help and documentation", Severity::COSMETIC));
        AuditResult::new("https://example.com/", findings, Vec::new())
    }

    #[test]
    fn test_text_report_empty() {
        let result = AuditResult::new("https://example.com/", FindingSet::new(), Vec::new());
        let report = generate_report(&result, OutputFormat::Text);
        assert!(report.contains("No usability or accessibility issues found"));
    }

    #[test]
    fn test_text_report_with_findings() {
        let report = generate_report(&sample_result(), OutputFormat::Text);
        assert!(report.contains("URL: https://example.com/"));
        assert!(report.contains("--- CRITICAL (severity 4, 1) ---"));
        assert!(report.contains("[WCAG] Text must have sufficient color contrast"));
        assert!(report.contains("Box: 10,10 50x20"));
        assert!(report.contains("RESULT: CRITICAL ISSUES FOUND"));
    }

    #[test]
    fn test_json_report() {
        let report = generate_report(&sample_result(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert!(parsed["findings"].is_array());
        assert_eq!(parsed["findings"][0]["type"], "WCAG");
        assert_eq!(parsed["url"], "https://example.com/");
    }

    #[test]
    fn test_sarif_report() {
        let report = generate_report(&sample_result(), OutputFormat::Sarif);
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let results = &parsed["runs"][0]["results"];
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[0]["ruleId"], "wcag-1.4.3");
        assert_eq!(results[1]["level"], "note");
        assert_eq!(results[1]["ruleId"], "heuristic-10");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "https://example.com/"
        );
    }

    #[test]
    fn test_sarif_rule_ids() {
        let alt = Finding::wcag(alt_text::RULE, Severity::MAJOR);
        let status = Finding::heuristic("visibility of system status ", Severity::MINOR);
        let unknown = Finding::heuristic("Delight", Severity::MINOR);
        assert_eq!(sarif_rule_id(&alt), "wcag-1.1.1");
        assert_eq!(sarif_rule_id(&status), "heuristic-1");
        assert_eq!(sarif_rule_id(&unknown), "heuristic");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("sarif".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
