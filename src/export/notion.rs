// SPDX-License-Identifier: PMPL-1.0-or-later
//! Notion export
//!
//! Creates one page per finding in a database shared with the
//! integration. The database needs a title property `Type`, rich-text
//! properties `Rule`, `Element` and `Suggestion`, and a number property
//! `Severity`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{check_status, ExportSink};
use crate::config::NotionConfig;
use crate::error::Result;
use crate::finding::Finding;

const SINK: &str = "Notion";

/// Notion rejects rich-text content longer than this
const MAX_TEXT_CHARS: usize = 2000;

pub struct NotionExporter {
    client: Client,
    api_base: String,
    token: String,
    database_id: String,
    notion_version: String,
}

fn text(content: &str) -> Value {
    let content: String = content.chars().take(MAX_TEXT_CHARS).collect();
    json!([{ "text": { "content": content } }])
}

/// Page payload for one finding
pub fn page_payload(database_id: &str, finding: &Finding) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Type": { "title": text(&finding.kind.to_string()) },
            "Rule": { "rich_text": text(&finding.rule) },
            "Severity": { "number": finding.severity.value() },
            "Element": { "rich_text": text(&finding.element) },
            "Suggestion": { "rich_text": text(&finding.suggestion) }
        }
    })
}

impl NotionExporter {
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            database_id: config.database_id.clone(),
            notion_version: config.notion_version.clone(),
        }
    }
}

#[async_trait]
impl ExportSink for NotionExporter {
    fn name(&self) -> &str {
        SINK
    }

    async fn export(&self, findings: &[Finding]) -> Result<()> {
        let url = format!("{}/v1/pages", self.api_base);

        for (idx, finding) in findings.iter().enumerate() {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header("Notion-Version", &self.notion_version)
                .json(&page_payload(&self.database_id, finding))
                .send()
                .await?;
            check_status(SINK, response).await?;
            debug!("Created Notion page {}/{}", idx + 1, findings.len());
        }

        info!("Exported {} finding(s) to Notion database {}", findings.len(), self.database_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    #[test]
    fn test_page_payload_properties() {
        let finding = Finding::heuristic("Error prevention", Severity::MAJOR)
            .with_element("checkout form")
            .with_suggestion("Confirm before deleting.");
        let payload = page_payload("db1", &finding);
        assert_eq!(payload["parent"]["database_id"], "db1");
        assert_eq!(payload["properties"]["Type"]["title"][0]["text"]["content"], "Heuristic");
        assert_eq!(payload["properties"]["Rule"]["rich_text"][0]["text"]["content"], "Error prevention");
        assert_eq!(payload["properties"]["Severity"]["number"], 3);
        assert_eq!(payload["properties"]["Element"]["rich_text"][0]["text"]["content"], "checkout form");
    }

    #[test]
    fn test_long_text_truncated() {
        let finding = Finding::wcag("r", Severity::MINOR).with_element("x".repeat(5000));
        let payload = page_payload("db1", &finding);
        let content = payload["properties"]["Element"]["rich_text"][0]["text"]["content"]
            .as_str()
            .expect("string content");
        assert_eq!(content.chars().count(), MAX_TEXT_CHARS);
    }
}
