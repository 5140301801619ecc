// SPDX-License-Identifier: PMPL-1.0-or-later
//! Google Sheets export (Sheets REST API v4)
//!
//! Adds a fresh worksheet to an existing spreadsheet, then appends the
//! header row and one row per finding in a single append call.
//!
//! Authenticates as a service account (see [`super::google_auth`]) or with
//! a pre-minted access token from config.
//!
//! # Security considerations
//!
//! The access token is passed only to `bearer_auth()`. It is never logged.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use super::google_auth::{ServiceAccountAuth, ServiceAccountKey, SHEETS_SCOPE};
use super::{check_status, finding_row, ExportSink, EXPORT_HEADERS};
use crate::config::SheetsConfig;
use crate::error::{Error, Result};
use crate::finding::Finding;

const SINK: &str = "Google Sheets";

/// Columns reserved on the new worksheet
const WORKSHEET_COLUMNS: usize = 10;

enum Credentials {
    Token(String),
    ServiceAccount(ServiceAccountAuth),
}

impl Credentials {
    fn from_config(client: &Client, config: &SheetsConfig) -> Result<Self> {
        let token = config.access_token.as_deref().filter(|t| !t.is_empty());
        let key_path = config.credentials_path.as_deref().filter(|p| !p.is_empty());

        match (token, key_path) {
            (Some(token), _) => Ok(Credentials::Token(token.to_string())),
            (None, Some(path)) => {
                let key = ServiceAccountKey::from_file(Path::new(path))?;
                let auth = ServiceAccountAuth::new(client.clone(), key, SHEETS_SCOPE)?;
                Ok(Credentials::ServiceAccount(auth))
            }
            (None, None) => Err(Error::Config(
                "[sheets] needs credentials_path or access_token".to_string(),
            )),
        }
    }

    async fn bearer(&self) -> Result<String> {
        match self {
            Credentials::Token(token) => Ok(token.clone()),
            Credentials::ServiceAccount(auth) => auth.access_token().await,
        }
    }
}

pub struct SheetsExporter {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    credentials: Credentials,
    worksheet_title: String,
}

/// Accept a bare id or a `.../spreadsheets/d/<id>/...` URL
pub fn spreadsheet_id(spreadsheet: &str) -> Option<String> {
    let trimmed = spreadsheet.trim();
    if !trimmed.contains('/') {
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    let url = Url::parse(trimmed).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "d")?;
    segments.next().filter(|id| !id.is_empty()).map(str::to_string)
}

impl SheetsExporter {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id(&config.spreadsheet).ok_or_else(|| {
            Error::Config(format!("not a spreadsheet id or URL: {}", config.spreadsheet))
        })?;

        let client = Client::new();
        let credentials = Credentials::from_config(&client, config)?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            spreadsheet_id,
            credentials,
            worksheet_title: config.worksheet_title.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid Sheets API base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn add_worksheet(&self, token: &str, rows: usize) -> Result<()> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.endpoint(&["v4", "spreadsheets", target.as_str()])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": self.worksheet_title,
                        "gridProperties": { "rowCount": rows, "columnCount": WORKSHEET_COLUMNS }
                    }
                }
            }]
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check_status(SINK, response).await?;
        Ok(())
    }

    async fn append_rows(&self, token: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let range = format!("'{}'!A1", self.worksheet_title.replace('\'', "''"));
        let target = format!("{}:append", range);
        let url = self.endpoint(&[
            "v4",
            "spreadsheets",
            self.spreadsheet_id.as_str(),
            "values",
            target.as_str(),
        ])?;

        let response = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&json!({ "majorDimension": "ROWS", "values": values }))
            .send()
            .await?;
        check_status(SINK, response).await?;
        Ok(())
    }
}

#[async_trait]
impl ExportSink for SheetsExporter {
    fn name(&self) -> &str {
        SINK
    }

    async fn export(&self, findings: &[Finding]) -> Result<()> {
        let token = self
            .credentials
            .bearer()
            .await
            .map_err(|e| Error::export(SINK, e.to_string()))?;
        self.add_worksheet(&token, findings.len() + 1).await?;

        let mut values: Vec<Vec<Value>> = Vec::with_capacity(findings.len() + 1);
        values.push(EXPORT_HEADERS.iter().map(|h| json!(h)).collect());
        values.extend(findings.iter().map(finding_row));
        self.append_rows(&token, values).await?;

        info!(
            "Exported {} finding(s) to worksheet \"{}\" of spreadsheet {}",
            findings.len(),
            self.worksheet_title,
            self.spreadsheet_id
        );
        Ok(())
    }
}
