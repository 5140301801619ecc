// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility rule engine implementing WCAG checks.
//!
//! Rules walk the parsed markup together with the positions the renderer
//! measured for the same document, and emit findings in document order.
//! The engine is pure: no I/O, deterministic output for the same input.

pub mod alt_text;
pub mod contrast;

use crate::finding::{Finding, Rect};
use crate::render::ContrastSample;
use scraper::{ElementRef, Html};

/// Renderer measurements handed to the rules
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    /// One slot per alt-missing image, document order
    pub img_positions: &'a [Option<Rect>],
    /// Low-contrast inline-styled elements, document order
    pub contrast_positions: &'a [ContrastSample],
}

/// Trait implemented by all rules
pub trait Rule: Send + Sync {
    /// Human-readable name of this rule
    fn name(&self) -> &str;

    /// Check the document and return findings in document order
    fn check(&self, document: &Html, evidence: &Evidence<'_>) -> Vec<Finding>;
}

/// Run every rule over the page, alt text first, then contrast
pub fn wcag_checks(
    html: &str,
    img_positions: &[Option<Rect>],
    contrast_positions: &[ContrastSample],
) -> Vec<Finding> {
    let rules: Vec<Box<dyn Rule>> = vec![
        Box::new(alt_text::AltTextRule),
        Box::new(contrast::ContrastRule),
    ];

    let document = Html::parse_document(html);
    let evidence = Evidence {
        img_positions,
        contrast_positions,
    };

    let mut findings = Vec::new();
    for rule in &rules {
        let found = rule.check(&document, &evidence);
        tracing::debug!("{}: {} finding(s)", rule.name(), found.len());
        findings.extend(found);
    }
    findings
}

/// Whether `element` sits in `<template>` content. Browsers keep that
/// content out of the live DOM, so `querySelectorAll` never sees it.
pub(crate) fn in_template(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map_or(false, |el| el.name() == "template")
    })
}

/// Append ` | id=...` and ` | class=...` to a descriptor
pub(crate) fn with_identity(mut descriptor: String, element: &ElementRef<'_>) -> String {
    if let Some(id) = element.value().attr("id").filter(|id| !id.is_empty()) {
        descriptor.push_str(&format!(" | id={}", id));
    }
    let classes: Vec<&str> = element
        .value()
        .attr("class")
        .map(|c| c.split_whitespace().collect())
        .unwrap_or_default();
    if !classes.is_empty() {
        descriptor.push_str(&format!(" | class={}", classes.join(" ")));
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    #[test]
    fn test_alt_findings_precede_contrast_findings() {
        let html = r#"<html><body>
            <p style="color: #eee">faint</p>
            <img src="a.png">
        </body></html>"#;
        let samples = vec![ContrastSample {
            bbox: Rect::new(0.0, 0.0, 5.0, 5.0),
            color: "#eee".to_string(),
            background: None,
            ratio: 1.16,
        }];
        let findings = wcag_checks(html, &[], &samples);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule, alt_text::RULE);
        assert_eq!(findings[1].rule, contrast::RULE);
        assert_eq!(findings[1].severity, Severity::CRITICAL);
    }

    #[test]
    fn test_clean_page_has_no_findings() {
        let html = r#"<img src="a.png" alt="A chart"><p style="color:#000">ok</p>"#;
        assert!(wcag_checks(html, &[], &[]).is_empty());
    }

    #[test]
    fn test_template_content_does_not_shift_positions() {
        let html = r#"<template><img src="tpl.png"></template><img src="real.png">"#;
        let real = Rect::new(1.0, 2.0, 3.0, 4.0);
        let findings = wcag_checks(html, &[Some(real)], &[]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].element.contains("real.png"));
        assert_eq!(findings[0].bbox, Some(real));
    }

    #[test]
    fn test_in_template() {
        let doc = Html::parse_document(
            r#"<body><template><div><span id="inner">x</span></div></template><span id="outer">y</span></body>"#,
        );
        let sel = scraper::Selector::parse("span").expect("valid selector");
        let spans: Vec<_> = doc.select(&sel).collect();
        let inner = spans.iter().find(|s| s.value().id() == Some("inner")).expect("inner span");
        let outer = spans.iter().find(|s| s.value().id() == Some("outer")).expect("outer span");
        assert!(in_template(inner));
        assert!(!in_template(outer));
    }

    #[test]
    fn test_identity_suffixes() {
        let doc = Html::parse_fragment(r#"<div id="main" class="  hero   dark ">x</div>"#);
        let sel = scraper::Selector::parse("div").expect("valid selector");
        let el = doc.select(&sel).next().expect("div present");
        assert_eq!(
            with_identity("desc".to_string(), &el),
            "desc | id=main | class=hero dark"
        );
    }

    #[test]
    fn test_empty_identity_is_omitted() {
        let doc = Html::parse_fragment(r#"<div id="" class=" ">x</div>"#);
        let sel = scraper::Selector::parse("div").expect("valid selector");
        let el = doc.select(&sel).next().expect("div present");
        assert_eq!(with_identity("desc".to_string(), &el), "desc");
    }
}
