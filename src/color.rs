// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color model - WCAG 1.4.3 Contrast (Minimum)
//!
//! Parses CSS hex and `rgb()` literals and computes relative luminance
//! and contrast ratios using the WCAG 2.x formulas.
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

use regex::Regex;
use std::sync::LazyLock;

/// WCAG AA minimum contrast for body text
pub const WCAG_AA_CONTRAST: f64 = 4.5;

/// Ratios below this are critical failures
pub const CRITICAL_CONTRAST: f64 = 3.0;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid regex"));

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::new(r, g, b)
    }
}

/// Parse a hex or `rgb()`/`rgba()` literal.
///
/// Returns `None` for anything else: named colors, gradients,
/// `currentColor`, empty strings and out-of-range channels.
pub fn parse_color(text: &str) -> Option<Color> {
    let value = text.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        parse_hex(hex)
    } else if value.starts_with("rgb") {
        parse_rgb(&value)
    } else {
        None
    }
}

/// `rgb`, `rgba`, `rrggbb` and `rrggbbaa` digit strings (no `#`)
fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let group = match hex.len() {
        3 | 4 => 1,
        6 | 8 => 2,
        _ => return None,
    };
    let channel = |i: usize| -> Option<u8> {
        let digits = &hex[i * group..(i + 1) * group];
        let v = u8::from_str_radix(digits, 16).ok()?;
        // #abc is shorthand for #aabbcc
        Some(if group == 1 { v * 17 } else { v })
    };
    Some(Color::new(channel(0)?, channel(1)?, channel(2)?))
}

/// First three numeric components of an `rgb(...)`/`rgba(...)` literal,
/// truncated to integers. Negative channels are out of range.
fn parse_rgb(value: &str) -> Option<Color> {
    let mut channels = NUMBER_RE.find_iter(value).take(3).map(|m| {
        let n: f64 = m.as_str().parse().ok()?;
        let n = n.trunc();
        (!n.is_sign_negative() && n <= 255.0).then_some(n as u8)
    });
    let r = channels.next()??;
    let g = channels.next()??;
    let b = channels.next()??;
    Some(Color::new(r, g, b))
}

/// Relative luminance per WCAG 2.x
pub fn luminance(color: Color) -> f64 {
    let [r, g, b] = [color.r, color.g, color.b].map(|c| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Contrast ratio between two colors, in `1.0..=21.0`
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let l1 = luminance(a);
    let l2 = luminance(b);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}
