// SPDX-License-Identifier: PMPL-1.0-or-later
//! Finding types shared by the rule engine, the heuristic reviewer,
//! the annotator and the export sinks.

use serde::{Deserialize, Serialize};

/// Where a finding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    /// Deterministic WCAG rule
    #[serde(rename = "WCAG")]
    Wcag,
    /// Language-model heuristic review
    Heuristic,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingKind::Wcag => write!(f, "WCAG"),
            FindingKind::Heuristic => write!(f, "Heuristic"),
        }
    }
}

/// Severity on a 1 (no issue) to 4 (critical) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const COSMETIC: Severity = Severity(1);
    pub const MINOR: Severity = Severity(2);
    pub const MAJOR: Severity = Severity(3);
    pub const CRITICAL: Severity = Severity(4);

    /// All severities, most severe first
    pub const ALL: [Severity; 4] = [
        Severity::CRITICAL,
        Severity::MAJOR,
        Severity::MINOR,
        Severity::COSMETIC,
    ];

    /// Create a severity, rejecting values outside 1..=4
    pub fn new(value: u8) -> Option<Self> {
        (1..=4).contains(&value).then_some(Severity(value))
    }

    /// Create a severity, clamping any value into 1..=4
    pub fn clamped(value: i64) -> Self {
        Severity(value.clamp(1, 4) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            4 => "CRITICAL",
            3 => "MAJOR",
            2 => "MINOR",
            _ => "COSMETIC",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Severity::new(value).ok_or_else(|| format!("severity must be 1..=4, got {}", value))
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element bounding box in page-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left and bottom-right corners
    pub fn corners(&self) -> ((f64, f64), (f64, f64)) {
        ((self.x, self.y), (self.x + self.width, self.y + self.height))
    }
}

/// One audit finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub rule: String,
    pub severity: Severity,
    /// Free-text element descriptor (may carry id/class)
    pub element: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Rect>,
}

impl Finding {
    /// Create a WCAG finding
    pub fn wcag(rule: &str, severity: Severity) -> Self {
        Self::new(FindingKind::Wcag, rule, severity)
    }

    /// Create a heuristic finding
    pub fn heuristic(rule: &str, severity: Severity) -> Self {
        Self::new(FindingKind::Heuristic, rule, severity)
    }

    fn new(kind: FindingKind, rule: &str, severity: Severity) -> Self {
        Self {
            kind,
            rule: rule.to_string(),
            severity,
            element: String::new(),
            suggestion: String::new(),
            bbox: None,
        }
    }

    /// Set the element descriptor
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = element.into();
        self
    }

    /// Set suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Set (or clear) the bounding box
    pub fn with_bbox(mut self, bbox: Option<Rect>) -> Self {
        self.bbox = bbox;
        self
    }
}

/// An ordered collection of findings for one audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingSet {
    pub findings: Vec<Finding>,
}

impl FindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    pub fn by_kind(&self, kind: FindingKind) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.kind == kind).collect()
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.severity == severity).collect()
    }

    /// Findings that can be drawn on the screenshot
    pub fn located(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.bbox.is_some()).collect()
    }

    pub fn has_critical(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::CRITICAL)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.findings
    }
}

impl From<Vec<Finding>> for FindingSet {
    fn from(findings: Vec<Finding>) -> Self {
        Self { findings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_range() {
        assert!(Severity::new(0).is_none());
        assert!(Severity::new(5).is_none());
        assert_eq!(Severity::new(3), Some(Severity::MAJOR));
        assert_eq!(Severity::clamped(-2), Severity::COSMETIC);
        assert_eq!(Severity::clamped(9), Severity::CRITICAL);
    }

    #[test]
    fn test_finding_serializes_with_type_field() {
        let finding = Finding::wcag("Images must have alt text", Severity::MAJOR)
            .with_element("<img src=\"a.png\">")
            .with_bbox(Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
        let json = serde_json::to_value(&finding).expect("serialize");
        assert_eq!(json["type"], "WCAG");
        assert_eq!(json["severity"], 3);
        assert_eq!(json["bbox"]["width"], 3.0);
    }

    #[test]
    fn test_finding_without_bbox_omits_field() {
        let finding = Finding::heuristic("Error prevention", Severity::COSMETIC);
        let json = serde_json::to_value(&finding).expect("serialize");
        assert_eq!(json["type"], "Heuristic");
        assert!(json.get("bbox").is_none());
    }

    #[test]
    fn test_out_of_range_severity_rejected() {
        let raw = r#"{"type":"WCAG","rule":"r","severity":7,"element":"","suggestion":""}"#;
        assert!(serde_json::from_str::<Finding>(raw).is_err());
    }

    #[test]
    fn test_rect_corners() {
        let rect = Rect::new(10.0, 10.0, 50.0, 20.0);
        assert_eq!(rect.corners(), ((10.0, 10.0), (60.0, 30.0)));
    }

    #[test]
    fn test_finding_set_queries() {
        let mut set = FindingSet::new();
        set.add(Finding::wcag("a", Severity::CRITICAL).with_bbox(Some(Rect::new(0.0, 0.0, 1.0, 1.0))));
        set.add(Finding::heuristic("b", Severity::COSMETIC));
        assert_eq!(set.len(), 2);
        assert!(set.has_critical());
        assert_eq!(set.located().len(), 1);
        assert_eq!(set.by_kind(FindingKind::Heuristic).len(), 1);
        assert_eq!(set.by_severity(Severity::CRITICAL).len(), 1);
    }
}
