// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration management for usabilitybot
//!
//! Credentials (reviewer API key, Sheets service account, Notion token) are
//! read here and passed explicitly into each component; nothing below this
//! layer looks at the environment.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Browser automation endpoint
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Language-model heuristic reviewer
    #[serde(default)]
    pub reviewer: ReviewerConfig,

    /// Google Sheets export
    #[serde(default)]
    pub sheets: Option<SheetsConfig>,

    /// Notion export
    #[serde(default)]
    pub notion: Option<NotionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebDriverConfig {
    /// WebDriver server (chromedriver, geckodriver, selenium)
    #[serde(default = "default_webdriver_endpoint")]
    pub endpoint: String,

    /// Browser name sent in the session capabilities
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Browser command-line arguments
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Page load timeout (milliseconds)
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_ms: u64,

    /// Extra wait after load for late scripts (milliseconds)
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Viewport width used for the capture
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Widest window the full-page capture will resize to
    #[serde(default = "default_max_page_width")]
    pub max_page_width: u32,

    /// Tallest window the full-page capture will resize to
    #[serde(default = "default_max_page_height")]
    pub max_page_height: u32,

    /// Timeout for each WebDriver command (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_webdriver_endpoint(),
            browser: default_browser(),
            args: default_browser_args(),
            page_load_timeout_ms: default_page_load_timeout(),
            settle_ms: default_settle(),
            viewport_width: default_viewport_width(),
            max_page_width: default_max_page_width(),
            max_page_height: default_max_page_height(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_webdriver_endpoint() -> String {
    "http://localhost:9515".to_string()
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_browser_args() -> Vec<String> {
    vec!["--headless=new".to_string(), "--hide-scrollbars".to_string()]
}

fn default_page_load_timeout() -> u64 {
    60_000
}

fn default_settle() -> u64 {
    3_000
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_max_page_width() -> u32 {
    4096
}

fn default_max_page_height() -> u32 {
    16_384
}

fn default_request_timeout() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReviewerConfig {
    /// Run the heuristic review at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible API base
    #[serde(default = "default_reviewer_endpoint")]
    pub endpoint: String,

    /// API key; falls back to OPENAI_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_reviewer_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reviewer_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f32 {
    0.2
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet id or full spreadsheet URL
    pub spreadsheet: String,

    /// Service-account key file (JSON); falls back to
    /// GOOGLE_APPLICATION_CREDENTIALS
    #[serde(default)]
    pub credentials_path: Option<String>,

    /// Pre-minted OAuth bearer token; overrides `credentials_path`
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_worksheet_title")]
    pub worksheet_title: String,

    #[serde(default = "default_sheets_api")]
    pub api_base: String,
}

fn default_worksheet_title() -> String {
    "Audit Results".to_string()
}

fn default_sheets_api() -> String {
    "https://sheets.googleapis.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotionConfig {
    /// Integration token
    pub token: String,

    /// Target database (shared with the integration)
    pub database_id: String,

    #[serde(default = "default_notion_api")]
    pub api_base: String,

    #[serde(default = "default_notion_version")]
    pub notion_version: String,
}

fn default_notion_api() -> String {
    "https://api.notion.com".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

impl Config {
    /// Load configuration from file, with `USABILITYBOT__*` environment
    /// overrides. A missing file yields defaults plus environment.
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
        }

        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("USABILITYBOT").separator("__"));

        let mut parsed: Config = builder.build()?.try_deserialize()?;

        if parsed.reviewer.api_key.is_none() {
            parsed.reviewer.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        if let Some(sheets) = parsed.sheets.as_mut() {
            if sheets.credentials_path.is_none() {
                sheets.credentials_path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
                    .ok()
                    .filter(|p| !p.is_empty());
            }
        }

        Ok(parsed)
    }
}
