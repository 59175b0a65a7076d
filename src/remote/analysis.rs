use std::collections::BTreeMap;

use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{post_json, require_endpoint, RemoteError};

/// Input to the analysis function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub client_id: String,
    pub bucket: String,
    pub key: String,
    pub current_message: String,
}

impl AnalysisRequest {
    /// Labels of the fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("client ID", &self.client_id),
            ("bucket", &self.bucket),
            ("key", &self.key),
            ("current message", &self.current_message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

/// Summary returned by the analysis function. Every field is optional and
/// keys this type does not know about are carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_life_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl AnalysisSummary {
    /// Label/value pairs for display, known fields first.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        let known = [
            ("Tone", self.client_tone.clone()),
            ("Intent", self.client_intent.clone()),
            ("Life stage", self.client_life_stage.clone()),
            ("Sentiment", self.sentiment_label.clone()),
            ("Sentiment score", self.sentiment_score.map(|s| format!("{s:.2}"))),
            ("Priority", self.priority_level.clone()),
            ("Follow-up date", self.follow_up_date.clone()),
        ];

        let mut rows: Vec<(String, String)> = known
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| (label.to_string(), v)))
            .collect();
        rows.extend(self.extra.iter().map(|(k, v)| {
            let shown = match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), shown)
        }));
        rows
    }
}

#[derive(Deserialize)]
struct AnalysisResponse {
    summary: AnalysisSummary,
}

/// A completed analysis: what was asked and what came back. This is the
/// payload forwarded when a recommendation is saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub request: AnalysisRequest,
    pub summary: AnalysisSummary,
}

/// Client for the natural-language analysis function.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisSummary, RemoteError> {
        let url = require_endpoint(&self.endpoint, "analysis")?;
        let body = post_json(&self.http, url, request)?;
        let response: AnalysisResponse = serde_json::from_str(&body)?;

        info!(
            "Analysis for client {} returned {} recommendation(s)",
            request.client_id,
            response.summary.recommendations.len()
        );
        Ok(response.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_client;
    use mockito::{Matcher, Server};

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            client_id: "C-1042".into(),
            bucket: "client-notes".into(),
            key: "history/C-1042.csv".into(),
            current_message: "Thinking about retiring early next year.".into(),
        }
    }

    #[test]
    fn missing_fields_lists_blank_inputs() {
        let mut req = request();
        assert!(req.missing_fields().is_empty());
        req.bucket = "  ".into();
        req.current_message.clear();
        assert_eq!(req.missing_fields(), vec!["bucket", "current message"]);
    }

    #[test]
    fn analyze_posts_request_and_decodes_summary() {
        let mut server = Server::new();
        let analyze_mock = server
            .mock("POST", "/analyze")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::to_value(request()).unwrap()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"summary": {
                "client_tone": "anxious",
                "client_intent": "plan retirement",
                "sentiment_score": -0.35,
                "sentiment_label": "NEGATIVE",
                "recommendations": ["Book a planning call", "Send annuity overview"],
                "priority_level": "High",
                "follow_up_date": "2024-01-10",
                "risk_flag": true
            }}"#,
            )
            .create();
        let client = AnalysisClient::new(test_client(), format!("{}/analyze", server.url()));

        let summary = client.analyze(&request()).unwrap();
        assert_eq!(summary.client_tone.as_deref(), Some("anxious"));
        assert_eq!(summary.client_life_stage, None);
        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(summary.extra.get("risk_flag"), Some(&JsonValue::Bool(true)));

        analyze_mock.assert();
    }

    #[test]
    fn non_200_surfaces_error_field() {
        let mut server = Server::new();
        let analyze_mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "model quota exceeded"}"#)
            .create();
        let client = AnalysisClient::new(test_client(), server.url());

        let err = client.analyze(&request()).unwrap_err();
        match err {
            RemoteError::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
        analyze_mock.assert();
    }

    #[test]
    fn body_without_summary_is_a_decode_error() {
        let mut server = Server::new();
        let analyze_mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"status": "ok"}"#)
            .create();
        let client = AnalysisClient::new(test_client(), server.url());
        assert!(matches!(
            client.analyze(&request()),
            Err(RemoteError::Decode(_))
        ));
        analyze_mock.assert();
    }

    #[test]
    fn display_rows_skip_absent_fields() {
        let summary = AnalysisSummary {
            client_tone: Some("calm".into()),
            sentiment_score: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            summary.display_rows(),
            vec![
                ("Tone".to_string(), "calm".to_string()),
                ("Sentiment score".to_string(), "0.50".to_string()),
            ]
        );
    }
}
