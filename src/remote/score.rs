//! Score submission over `POST /submit-score`.

use super::{RemoteError, ScoreReporter, build_http, read_body};
use crate::config::ClientConfig;

pub struct HttpScoreReporter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpScoreReporter {
    /// # Errors
    ///
    /// Returns [`RemoteError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        Ok(Self { http: build_http(config)?, base_url: config.base_url.clone() })
    }
}

#[async_trait::async_trait]
impl ScoreReporter for HttpScoreReporter {
    async fn submit(&self, score: u64) -> Result<ScoreReceipt, RemoteError> {
        let response = self
            .http
            .post(format!("{}/submit-score", self.base_url))
            .json(&ScoreRequest { score })
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let text = read_body(response).await?;
        parse_receipt(&text)
    }
}

#[derive(serde::Serialize)]
struct ScoreRequest {
    score: u64,
}

/// Acknowledgement returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ScoreReceipt {
    pub message: String,
    pub score: u64,
}

fn parse_receipt(json: &str) -> Result<ScoreReceipt, RemoteError> {
    serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "score_test.rs"]
mod tests;
