// SPDX-License-Identifier: PMPL-1.0-or-later
//! Usabilitybot - Web Usability & Accessibility Auditor
//!
//! Part of the gitbot-fleet ecosystem. Usabilitybot loads a live page in a
//! browser, runs deterministic WCAG checks against the rendered markup,
//! asks a language model for a review against Nielsen's heuristics, and
//! outlines every located issue on a full-page screenshot.
//!
//! ## Pipeline
//!
//! - **Render** ([`render`]): HTML, screenshot and element boxes via WebDriver
//! - **Rules** ([`analyzers`]): missing alt text (1.1.1), inline-style
//!   contrast (1.4.3)
//! - **Review** ([`heuristics`]): ten heuristic findings from the reviewer
//! - **Annotate** ([`annotate`]): red outlines on the screenshot
//! - **Export** ([`export`]): Google Sheets worksheet or Notion database

pub mod analyzers;
pub mod annotate;
pub mod audit;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod finding;
pub mod heuristics;
pub mod render;
pub mod report;
pub mod style;

pub use audit::{run_audit, AuditResult};
pub use config::Config;
pub use error::{Error, Result};
pub use finding::{Finding, FindingKind, FindingSet, Rect, Severity};
