// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast rule - WCAG 1.4.3 Contrast (Minimum, Level AA)
//!
//! Contrast is measured by the renderer from inline styles. This rule
//! turns each low-contrast sample into a finding and recovers the
//! element's id/class by searching `[style]` elements for the first one
//! whose style contains both color literals. When several elements share
//! the same declarations the first one in document order is reported.

use crate::analyzers::{in_template, with_identity, Evidence, Rule};
use crate::color::CRITICAL_CONTRAST;
use crate::finding::{Finding, Severity};
use crate::render::ContrastSample;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const RULE: &str = "Text must have sufficient color contrast";

/// WCAG success criterion
pub const CRITERION: &str = "1.4.3";

static STYLED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[style]").expect("valid selector"));

pub struct ContrastRule;

impl Rule for ContrastRule {
    fn name(&self) -> &str {
        "Color Contrast"
    }

    fn check(&self, document: &Html, evidence: &Evidence<'_>) -> Vec<Finding> {
        evidence
            .contrast_positions
            .iter()
            .map(|sample| {
                let background = sample.background.as_deref().unwrap_or("none");
                let descriptor = format!("color: {}, background: {}", sample.color, background);
                let element = match find_styled_element(document, sample) {
                    Some(el) => with_identity(descriptor, &el),
                    None => descriptor,
                };

                Finding::wcag(RULE, severity_for(sample.ratio))
                    .with_element(element)
                    .with_suggestion(format!(
                        "Increase contrast between text color {} and background {} (ratio: {:.2}).",
                        sample.color, background, sample.ratio
                    ))
                    .with_bbox(Some(sample.bbox))
            })
            .collect()
    }
}

/// Critical below 3:1, minor between 3:1 and 4.5:1
pub fn severity_for(ratio: f64) -> Severity {
    if ratio < CRITICAL_CONTRAST {
        Severity::CRITICAL
    } else {
        Severity::MINOR
    }
}

fn find_styled_element<'a>(document: &'a Html, sample: &ContrastSample) -> Option<ElementRef<'a>> {
    document.select(&STYLED_SELECTOR).filter(|el| !in_template(el)).find(|el| {
        let style = el.value().attr("style").unwrap_or("");
        style.contains(sample.color.as_str())
            && sample.background.as_deref().map_or(true, |bg| style.contains(bg))
    })
}
