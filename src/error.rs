// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for usabilitybot

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for usabilitybot
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Page render failed: {0}")]
    Render(String),

    #[error("Heuristic reviewer error: {0}")]
    Reviewer(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Export to {sink} failed: {message}")]
    Export { sink: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub(crate) fn export(sink: &str, message: impl Into<String>) -> Self {
        Error::Export {
            sink: sink.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
