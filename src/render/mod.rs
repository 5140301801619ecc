// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page rendering.
//!
//! The renderer is an external collaborator: it loads a URL in a real
//! browser and hands back the serialized DOM, a full-page screenshot and
//! the boxes of the elements the rule engine will report on.

pub mod webdriver;

pub use webdriver::WebDriverRenderer;

use crate::error::Result;
use crate::finding::Rect;
use crate::style::evaluate_inline_style;
use async_trait::async_trait;
use serde::Deserialize;

/// An inline-styled element whose contrast fell below the AA threshold
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastSample {
    pub bbox: Rect,
    /// Text color as written in the style attribute
    pub color: String,
    /// Background as written, `None` when implicit white
    pub background: Option<String>,
    pub ratio: f64,
}

/// Everything captured from one page load
#[derive(Debug, Clone, Default)]
pub struct PageCapture {
    pub html: String,
    /// Encoded screenshot (PNG)
    pub screenshot: Vec<u8>,
    /// One slot per alt-missing `img`, document order; `None` when the
    /// browser could not box the image
    pub img_positions: Vec<Option<Rect>>,
    /// Low-contrast inline-styled elements, document order
    pub contrast_positions: Vec<ContrastSample>,
}

/// Loads pages and captures what the audit needs
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<PageCapture>;
}

/// A `[style]` element as probed in the browser
#[derive(Debug, Clone, Deserialize)]
pub struct StyledElement {
    pub style: String,
    pub rect: Option<Rect>,
}

/// Keep styled elements below the contrast threshold that have a box,
/// preserving document order
pub fn contrast_samples(styled: &[StyledElement]) -> Vec<ContrastSample> {
    styled
        .iter()
        .filter_map(|el| {
            let bbox = el.rect?;
            let eval = evaluate_inline_style(&el.style)?;
            eval.is_insufficient().then(|| ContrastSample {
                bbox,
                color: eval.color,
                background: eval.background,
                ratio: eval.ratio,
            })
        })
        .collect()
}
