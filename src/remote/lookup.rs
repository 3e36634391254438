//! Combination lookup over `GET /get_combination`.
//!
//! Pure parsing in `parse_combination` for testability.

use super::{CombinationLookup, RemoteError, build_http, read_body};
use crate::config::ClientConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpCombinationLookup {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCombinationLookup {
    /// # Errors
    ///
    /// Returns [`RemoteError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        Ok(Self { http: build_http(config)?, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl CombinationLookup for HttpCombinationLookup {
    async fn combine(&self, first: &str, second: &str) -> Result<Option<String>, RemoteError> {
        let response = self
            .http
            .get(format!("{}/get_combination", self.base_url))
            .query(&[("element1", first), ("element2", second)])
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let text = read_body(response).await?;
        let result = parse_combination(&text)?;
        tracing::debug!(first, second, result = ?result, "combination lookup answered");
        Ok(result)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
struct CombinationReply {
    #[serde(default)]
    result: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract `result` from a lookup reply. Null, missing and blank results all
/// mean "no combination"; other fields are ignored.
fn parse_combination(json: &str) -> Result<Option<String>, RemoteError> {
    let reply: CombinationReply = serde_json::from_str(json).map_err(|e| RemoteError::Parse(e.to_string()))?;
    Ok(reply.result.filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
#[path = "lookup_test.rs"]
mod tests;
