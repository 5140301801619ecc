// SPDX-License-Identifier: PMPL-1.0-or-later
//! Inline style extraction.
//!
//! Only `style="..."` attributes are evaluated. Stylesheet rules and
//! computed styles are out of reach of this pass.

use crate::color::{contrast_ratio, parse_color, Color, WCAG_AA_CONTRAST};
use regex::Regex;
use std::sync::LazyLock;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|;)\s*color\s*:\s*([^;]+)").expect("valid regex"));
static BACKGROUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|;)\s*background(?:-color)?\s*:\s*([^;]+)").expect("valid regex")
});

/// Raw `color` and `background` values of one inline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineColors<'a> {
    pub color: Option<&'a str>,
    pub background: Option<&'a str>,
}

/// Extract `color` and `background`/`background-color` values.
///
/// Keys are case-sensitive; the first declaration of each wins.
pub fn extract_inline_styles(style: &str) -> InlineColors<'_> {
    let capture = |re: &Regex| {
        re.captures(style)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
    };
    InlineColors {
        color: capture(&COLOR_RE),
        background: capture(&BACKGROUND_RE),
    }
}

/// Contrast evaluation of one inline style
#[derive(Debug, Clone, PartialEq)]
pub struct InlineContrast {
    /// Text color as written in the style
    pub color: String,
    /// Background as written, if declared
    pub background: Option<String>,
    pub foreground_rgb: Color,
    pub background_rgb: Color,
    pub ratio: f64,
}

impl InlineContrast {
    /// Below the WCAG AA body-text minimum
    pub fn is_insufficient(&self) -> bool {
        self.ratio < WCAG_AA_CONTRAST
    }
}

/// Evaluate the contrast of an inline style.
///
/// Returns `None` when no parseable text color is declared. A missing or
/// unparseable background is taken to be white.
pub fn evaluate_inline_style(style: &str) -> Option<InlineContrast> {
    let colors = extract_inline_styles(style);
    let color = colors.color?;
    let foreground_rgb = parse_color(color)?;
    let background_rgb = colors.background.and_then(parse_color).unwrap_or(Color::WHITE);

    Some(InlineContrast {
        color: color.to_string(),
        background: colors.background.map(str::to_string),
        foreground_rgb,
        background_rgb,
        ratio: contrast_ratio(foreground_rgb, background_rgb),
    })
}
