//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use pagefetch_fetch::{FetchError, FetchResponse};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a fetched page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOutput {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    pub cacheable: bool,
    pub reasons_not_to_cache: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub length: usize,
    pub body: String,
}

/// JSON output for a failed fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }

    /// Converts a response to its output shape.
    pub fn response_to_output(&self, response: &FetchResponse) -> ResponseOutput {
        ResponseOutput {
            url: response.url().to_string(),
            status: response.status_code(),
            status_text: response.status_text(),
            expires: response.expires(),
            cacheable: response.is_cacheable(),
            reasons_not_to_cache: response
                .reasons_not_to_cache()
                .iter()
                .map(|r| r.code().to_string())
                .collect(),
            content_type: response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            length: response.body().len(),
            body: response.body().text().into_owned(),
        }
    }

    /// Formats a response.
    pub fn format_response(&self, response: &FetchResponse) -> Result<String> {
        self.format(&self.response_to_output(response))
    }

    /// Formats a fetch failure.
    pub fn format_error(&self, error: &FetchError) -> Result<String> {
        self.format(&ErrorOutput {
            kind: error.kind().as_str().to_string(),
            message: error.to_string(),
            url: error.url().map(str::to_string),
            status: error.status(),
        })
    }
}
