// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heuristic review against Nielsen's 10 usability heuristics.
//!
//! The reviewer is a language model reached through an OpenAI-compatible
//! chat-completions endpoint. Its reply is free text that should contain a
//! JSON array; anything unparseable degrades to no findings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ReviewerConfig;
use crate::error::{Error, Result};
use crate::finding::{Finding, Severity};

/// The ten heuristics the reviewer scores, one finding each
pub const NIELSEN_HEURISTICS: [&str; 10] = [
    "Visibility of system status",
    "Match between system and the real world",
    "User control and freedom",
    "Consistency and standards",
    "Error prevention",
    "Recognition rather than recall",
    "Flexibility and efficiency of use",
    "Aesthetic and minimalist design",
    "Help users recognize, diagnose, and recover from errors",
    "Help and documentation",
];

/// Characters of page HTML included in the prompt
pub const HTML_PROMPT_CHARS: usize = 8000;

/// Produces heuristic findings for a page
#[async_trait]
pub trait HeuristicReviewer: Send + Sync {
    async fn review(&self, html: &str, url: &str) -> Result<Vec<Finding>>;
}

/// Build the review prompt for `url`, embedding the head of its HTML
pub fn build_prompt(html: &str, url: &str) -> String {
    let excerpt: String = html.chars().take(HTML_PROMPT_CHARS).collect();
    let heuristics = NIELSEN_HEURISTICS
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}. {}", i + 1, h))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert UX auditor. Given the following HTML from {url}, analyze it for each of \
Nielsen's 10 usability heuristics:\n{heuristics}\n\n\
For each heuristic, provide:\n\
- 1-2 observations (if any issues found)\n\
- A suggestion for improvement (or say 'No issues found' if none)\n\
- A severity rating (1=minor, 4=critical; use 1 if no issues)\n\
Output as a JSON list of 10 objects (one per heuristic), each with: type (\"Heuristic\"), \
rule (heuristic), severity, element (area of the page, if known), suggestion.\n\
Always output a list of 10 objects, even if no issues are found.\n\n\
HTML:\n{excerpt}"
    )
}

#[derive(Debug, Deserialize)]
struct RawHeuristic {
    #[serde(default)]
    rule: Option<String>,
    #[serde(default)]
    severity: Option<Value>,
    #[serde(default, alias = "element/area", alias = "area")]
    element: Option<Value>,
    #[serde(default)]
    suggestion: Option<Value>,
}

impl RawHeuristic {
    fn into_finding(self) -> Finding {
        let severity = match &self.severity {
            Some(Value::Number(n)) => n.as_f64().map(|v| v as i64),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|v| v as i64),
            _ => None,
        }
        .map(Severity::clamped)
        .unwrap_or(Severity::COSMETIC);

        Finding::heuristic(self.rule.as_deref().unwrap_or_default(), severity)
            .with_element(text_of(self.element))
            .with_suggestion(text_of(self.suggestion))
    }
}

/// Flatten a free-form JSON field into display text
fn text_of(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|v| text_of(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

/// Parse the JSON array embedded in a reviewer reply.
///
/// Returns an empty list when no array can be recovered.
pub fn parse_heuristic_response(text: &str) -> Vec<Finding> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        warn!("Heuristic reply contained no JSON array");
        return Vec::new();
    };
    if end < start {
        warn!("Heuristic reply contained no JSON array");
        return Vec::new();
    }

    match serde_json::from_str::<Vec<RawHeuristic>>(&text[start..=end]) {
        Ok(items) => {
            if items.len() != NIELSEN_HEURISTICS.len() {
                warn!(
                    "Heuristic reply had {} entries, expected {}",
                    items.len(),
                    NIELSEN_HEURISTICS.len()
                );
            }
            items.into_iter().map(RawHeuristic::into_finding).collect()
        }
        Err(e) => {
            warn!("Heuristic reply was not valid JSON: {}", e);
            Vec::new()
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Reviewer backed by an OpenAI-compatible chat-completions API
pub struct OpenAiReviewer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiReviewer {
    pub fn new(config: &ReviewerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("reviewer.api_key is not set".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl HeuristicReviewer for OpenAiReviewer {
    async fn review(&self, html: &str, url: &str) -> Result<Vec<Finding>> {
        let prompt = build_prompt(html, url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("Requesting heuristic review from {} ({})", self.endpoint, self.model);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Reviewer(format!("API returned {}: {}", status, body)));
        }

        let text = response.text().await?;
        let content = match serde_json::from_str::<ChatResponse>(&text) {
            Ok(chat) => chat.choices.into_iter().next().and_then(|c| c.message.content),
            Err(e) => {
                warn!("Unexpected chat-completions payload: {}", e);
                None
            }
        };

        Ok(content.map(|c| parse_heuristic_response(&c)).unwrap_or_default())
    }
}
