// SPDX-License-Identifier: PMPL-1.0-or-later
//! W3C WebDriver renderer
//!
//! Drives chromedriver/geckodriver over the WebDriver JSON protocol: one
//! session per audit, deleted again whether the capture succeeded or not.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{contrast_samples, PageCapture, PageRenderer, StyledElement};
use crate::config::WebDriverConfig;
use crate::error::{Error, Result};
use crate::finding::Rect;

/// Full document size, used to size the window for a full-page capture
const DIMENSIONS_SCRIPT: &str = r#"
const doc = document.documentElement;
const body = document.body || doc;
return {
    width: Math.max(doc.scrollWidth, body.scrollWidth, doc.clientWidth),
    height: Math.max(doc.scrollHeight, body.scrollHeight, doc.clientHeight)
};
"#;

/// One pass over the DOM in document order. Alt-missing images keep a
/// slot even when they cannot be boxed so positions stay aligned with
/// the rule engine's own traversal.
const PROBE_SCRIPT: &str = r#"
const box = (el) => {
    const r = el.getBoundingClientRect();
    if (r.width === 0 && r.height === 0) { return null; }
    return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };
};
const images = Array.from(document.querySelectorAll('img'))
    .filter((img) => { const alt = img.getAttribute('alt'); return !alt || !alt.trim(); })
    .map(box);
const styled = Array.from(document.querySelectorAll('[style]'))
    .map((el) => ({ style: el.getAttribute('style') || '', rect: box(el) }));
return { images: images, styled: styled };
"#;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct Probe {
    images: Vec<Option<Rect>>,
    styled: Vec<StyledElement>,
}

/// Renderer backed by a WebDriver server
pub struct WebDriverRenderer {
    client: Client,
    config: WebDriverConfig,
}

impl WebDriverRenderer {
    pub fn new(config: &WebDriverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Send a command and unwrap the `{"value": ...}` envelope
    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Envelope<WireError>>(&text)
                .map(|e| format!("{}: {}", e.value.error, e.value.message))
                .unwrap_or(text);
            return Err(Error::Render(format!(
                "{} {} returned {}: {}",
                method, path, status, detail
            )));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        Ok(envelope.value)
    }

    fn capabilities(&self) -> Value {
        let options_key = if self.config.browser.eq_ignore_ascii_case("firefox") {
            "moz:firefoxOptions"
        } else {
            "goog:chromeOptions"
        };
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": self.config.browser,
                    options_key: { "args": self.config.args }
                }
            }
        })
    }

    async fn capture(&self, session: &str, url: &str) -> Result<PageCapture> {
        let base = format!("/session/{}", session);

        self.command::<Value>(
            Method::POST,
            &format!("{}/timeouts", base),
            Some(json!({ "pageLoad": self.config.page_load_timeout_ms })),
        )
        .await?;

        debug!("Navigating to {}", url);
        self.command::<Value>(Method::POST, &format!("{}/url", base), Some(json!({ "url": url })))
            .await?;

        if self.config.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        }

        let dims: Dimensions = self.execute(&base, DIMENSIONS_SCRIPT).await?;
        let (width, height) = self.window_size(&dims);
        debug!("Resizing window to {}x{} for full-page capture", width, height);
        self.command::<Value>(
            Method::POST,
            &format!("{}/window/rect", base),
            Some(json!({ "width": width, "height": height })),
        )
        .await?;

        let probe: Probe = self.execute(&base, PROBE_SCRIPT).await?;
        let html: String = self.command(Method::GET, &format!("{}/source", base), None).await?;
        let encoded: String = self
            .command(Method::GET, &format!("{}/screenshot", base), None)
            .await?;
        let screenshot = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;

        let contrast_positions = contrast_samples(&probe.styled);
        info!(
            "Captured {} ({} bytes HTML, {} alt-missing image(s), {} low-contrast element(s))",
            url,
            html.len(),
            probe.images.len(),
            contrast_positions.len()
        );

        Ok(PageCapture {
            html,
            screenshot,
            img_positions: probe.images,
            contrast_positions,
        })
    }

    /// Window size for a full-page capture, capped by config and never zero
    fn window_size(&self, dims: &Dimensions) -> (u32, u32) {
        let width = (dims.width.ceil() as u32)
            .max(self.config.viewport_width)
            .min(self.config.max_page_width)
            .max(1);
        let height = (dims.height.ceil() as u32)
            .min(self.config.max_page_height)
            .max(1);
        (width, height)
    }

    async fn execute<T: DeserializeOwned>(&self, base: &str, script: &str) -> Result<T> {
        self.command(
            Method::POST,
            &format!("{}/execute/sync", base),
            Some(json!({ "script": script, "args": [] })),
        )
        .await
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<PageCapture> {
        let session: NewSession = self
            .command(Method::POST, "/session", Some(self.capabilities()))
            .await?;
        debug!("Opened WebDriver session {}", session.session_id);

        let result = self.capture(&session.session_id, url).await;

        let path = format!("/session/{}", session.session_id);
        if let Err(e) = self.command::<Value>(Method::DELETE, &path, None).await {
            warn!("Failed to close WebDriver session {}: {}", session.session_id, e);
        }

        result
    }
}
