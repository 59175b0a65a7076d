use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;
use super::{post_json, require_endpoint, RemoteError};

/// The chosen recommendation plus the analysis it came from, and where the
/// persistence function should append the resulting row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub selected_index: usize,
    pub bucket: String,
    pub output_key: String,
    pub analysis: AnalysisResult,
}

impl RecommendationRequest {
    /// Fails when `selected_index` does not name one of the returned
    /// recommendations.
    pub fn new(
        analysis: &AnalysisResult,
        selected_index: usize,
        output_key: &str,
    ) -> Result<Self, RemoteError> {
        let available = analysis.summary.recommendations.len();
        if selected_index >= available {
            return Err(RemoteError::InvalidSelection {
                index: selected_index,
                available,
            });
        }
        Ok(Self {
            selected_index,
            bucket: analysis.request.bucket.trim().to_string(),
            output_key: output_key.trim().to_string(),
            analysis: analysis.clone(),
        })
    }

    pub fn selected_text(&self) -> &str {
        &self.analysis.summary.recommendations[self.selected_index]
    }
}

#[derive(Deserialize)]
struct SaveResponse {
    message: Option<String>,
}

/// Client for the recommendation-persistence function.
#[derive(Debug, Clone)]
pub struct RecommendationClient {
    http: Client,
    endpoint: String,
}

impl RecommendationClient {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the service's confirmation message.
    pub fn save(&self, request: &RecommendationRequest) -> Result<String, RemoteError> {
        let url = require_endpoint(&self.endpoint, "recommendation")?;
        let body = post_json(&self.http, url, request)?;

        info!(
            "Saved recommendation {} for client {} to {}/{}",
            request.selected_index,
            request.analysis.request.client_id,
            request.bucket,
            request.output_key
        );

        let message = serde_json::from_str::<SaveResponse>(&body)
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| body.trim().to_string());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::analysis::{AnalysisRequest, AnalysisSummary};
    use crate::testing::test_client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            request: AnalysisRequest {
                client_id: "C-7".into(),
                bucket: "client-notes".into(),
                key: "history/C-7.csv".into(),
                current_message: "Can we revisit my portfolio?".into(),
            },
            summary: AnalysisSummary {
                recommendations: vec!["Schedule review".into(), "Send rebalancing memo".into()],
                priority_level: Some("Medium".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let err = RecommendationRequest::new(&analysis(), 2, "out.csv").unwrap_err();
        assert!(matches!(
            err,
            RemoteError::InvalidSelection {
                index: 2,
                available: 2
            }
        ));
    }

    #[test]
    fn save_posts_choice_with_full_payload() {
        let mut server = Server::new();
        let save_mock = server
            .mock("POST", "/save")
            .match_body(Matcher::PartialJson(json!({
                "selected_index": 1,
                "output_key": "processed_client_data.csv",
                "bucket": "client-notes",
                "analysis": {
                    "client_id": "C-7",
                    "summary": {
                        "priority_level": "Medium",
                        "recommendations": ["Schedule review", "Send rebalancing memo"]
                    }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Row appended to processed_client_data.csv"}"#)
            .create();
        let client = RecommendationClient::new(test_client(), format!("{}/save", server.url()));
        let request =
            RecommendationRequest::new(&analysis(), 1, "processed_client_data.csv").unwrap();
        assert_eq!(request.selected_text(), "Send rebalancing memo");

        let message = client.save(&request).unwrap();
        assert_eq!(message, "Row appended to processed_client_data.csv");

        save_mock.assert();
    }

    #[test]
    fn plain_text_confirmation_is_returned_verbatim() {
        let mut server = Server::new();
        let save_mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("saved\n")
            .create();
        let client = RecommendationClient::new(test_client(), server.url());
        let request = RecommendationRequest::new(&analysis(), 0, "out.csv").unwrap();
        assert_eq!(client.save(&request).unwrap(), "saved");
        save_mock.assert();
    }

    #[test]
    fn failure_body_error_is_reported() {
        let mut server = Server::new();
        let save_mock = server
            .mock("POST", "/")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "AccessDenied"}"#)
            .create();
        let client = RecommendationClient::new(test_client(), server.url());
        let request = RecommendationRequest::new(&analysis(), 0, "out.csv").unwrap();
        let err = client.save(&request).unwrap_err();
        assert_eq!(err.to_string(), "Service responded with HTTP 403: AccessDenied");
        save_mock.assert();
    }
}
