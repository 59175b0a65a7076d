//! Typed clients for the remote serverless functions.
//!
//! Both are single-attempt blocking JSON POSTs. Anything but HTTP 200 is a
//! failure, and the body's `error` field is surfaced when present.

pub mod analysis;
pub mod recommendation;

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use analysis::{AnalysisClient, AnalysisRequest, AnalysisResult, AnalysisSummary};
pub use recommendation::{RecommendationClient, RecommendationRequest};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("No endpoint configured for the {0} service")]
    NotConfigured(&'static str),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service responded with HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Recommendation {index} is out of range ({available} available)")]
    InvalidSelection { index: usize, available: usize },
}

/// POST `body` as JSON and return the raw response text on HTTP 200.
fn post_json<T: Serialize + ?Sized>(
    http: &Client,
    url: &str,
    body: &T,
) -> Result<String, RemoteError> {
    debug!("POST {url}");
    let response = http.post(url).json(body).send()?;
    let status = response.status();
    if status != StatusCode::OK {
        // An unreadable error body still reports the status.
        let text = response.text().unwrap_or_default();
        return Err(RemoteError::Service {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }
    Ok(response.text()?)
}

/// The `error` field of a JSON error body, else the trimmed body itself.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .map(|e| match e {
            JsonValue::String(s) => s,
            other => other.to_string(),
        });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no error details".to_string(),
        None => body.trim().to_string(),
    }
}

fn require_endpoint<'a>(endpoint: &'a str, service: &'static str) -> Result<&'a str, RemoteError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(RemoteError::NotConfigured(service));
    }
    Ok(endpoint)
}
