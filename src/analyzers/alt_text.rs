// SPDX-License-Identifier: PMPL-1.0-or-later
//! Image alt text rule - WCAG 1.1.1 Non-text Content (Level A)
//!
//! Every `<img>` whose `alt` is absent or whitespace-only is reported.
//! Findings are paired with renderer boxes by ordinal position among
//! the alt-missing images. `<template>` content is skipped on both sides.

use crate::analyzers::{in_template, with_identity, Evidence, Rule};
use crate::finding::{Finding, Severity};
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const RULE: &str = "Images must have alt text";

/// WCAG success criterion
pub const CRITERION: &str = "1.1.1";

const SUGGESTION: &str = "Add descriptive alt text to this image.";

/// Characters of outer markup kept in the element descriptor
const MARKUP_PREVIEW_CHARS: usize = 100;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

pub struct AltTextRule;

impl Rule for AltTextRule {
    fn name(&self) -> &str {
        "Alt Text"
    }

    fn check(&self, document: &Html, evidence: &Evidence<'_>) -> Vec<Finding> {
        document
            .select(&IMG_SELECTOR)
            .filter(|img| !in_template(img))
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .map_or(true, |alt| alt.trim().is_empty())
            })
            .enumerate()
            .map(|(ordinal, img)| {
                let bbox = evidence.img_positions.get(ordinal).copied().flatten();
                let preview: String = img.html().chars().take(MARKUP_PREVIEW_CHARS).collect();

                Finding::wcag(RULE, Severity::MAJOR)
                    .with_element(with_identity(preview, &img))
                    .with_suggestion(SUGGESTION)
                    .with_bbox(bbox)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Rect;

    fn check(html: &str, positions: &[Option<Rect>]) -> Vec<Finding> {
        let document = Html::parse_document(html);
        let evidence = Evidence {
            img_positions: positions,
            contrast_positions: &[],
        };
        AltTextRule.check(&document, &evidence)
    }

    #[test]
    fn test_one_missing_one_present() {
        let html = r#"<html><body><img src="a.png"><img src="cat.png" alt="cat"></body></html>"#;
        let findings = check(html, &[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RULE);
        assert_eq!(findings[0].severity, Severity::MAJOR);
        assert_eq!(findings[0].suggestion, SUGGESTION);
        assert!(findings[0].element.starts_with("<img"));
    }

    #[test]
    fn test_whitespace_alt_is_missing() {
        let findings = check(r#"<img src="a.png" alt="   ">"#, &[]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_empty_alt_is_missing() {
        let findings = check(r#"<img src="divider.png" alt="">"#, &[]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_positional_pairing() {
        let html = r#"
            <img src="a.png">
            <img src="b.png" alt="described">
            <img src="c.png">
            <img src="d.png">
        "#;
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        let second = Rect::new(5.0, 50.0, 20.0, 20.0);
        let findings = check(html, &[Some(first), Some(second)]);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].bbox, Some(first));
        assert!(findings[0].element.contains("a.png"));
        assert_eq!(findings[1].bbox, Some(second));
        assert!(findings[1].element.contains("c.png"));
        // Positions ran out
        assert_eq!(findings[2].bbox, None);
    }

    #[test]
    fn test_empty_slot_keeps_alignment() {
        let html = r#"<img src="a.png"><img src="b.png">"#;
        let second = Rect::new(1.0, 2.0, 3.0, 4.0);
        let findings = check(html, &[None, Some(second)]);
        assert_eq!(findings[0].bbox, None);
        assert_eq!(findings[1].bbox, Some(second));
    }

    #[test]
    fn test_template_images_skipped() {
        let html = r#"<body>
            <template id="card"><img src="placeholder.png"></template>
            <img src="a.png">
            <template><div><img src="nested.png"></div></template>
            <img src="b.png">
        </body>"#;
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        let second = Rect::new(0.0, 40.0, 10.0, 10.0);
        let findings = check(html, &[Some(first), Some(second)]);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].element.contains("a.png"));
        assert_eq!(findings[0].bbox, Some(first));
        assert!(findings[1].element.contains("b.png"));
        assert_eq!(findings[1].bbox, Some(second));
    }

    #[test]
    fn test_descriptor_truncated_with_identity() {
        let long_src = "x".repeat(200);
        let html = format!(r#"<img id="hero" class="wide banner" src="{}.png">"#, long_src);
        let findings = check(&html, &[]);
        let element = &findings[0].element;
        let (preview, suffix) = element.split_once(" | ").expect("identity suffix");
        assert_eq!(preview.chars().count(), MARKUP_PREVIEW_CHARS);
        assert_eq!(suffix, "id=hero | class=wide banner");
    }
}
