//! Remote: HTTP clients for the element service.
//!
//! DESIGN
//! ======
//! Two seams, each an async trait so the session runtime can be driven by
//! mocks in tests: [`CombinationLookup`] asks what a pair of elements makes,
//! [`ScoreReporter`] submits a finished score. The HTTP implementations share
//! one `reqwest::Client` built from [`ClientConfig`] timeouts.

pub mod lookup;
pub mod score;

use std::time::Duration;

use crate::config::ClientConfig;
use crate::merge::LookupOutcome;

pub use lookup::HttpCombinationLookup;
pub use score::{HttpScoreReporter, ScoreReceipt};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote service calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl From<Result<Option<String>, RemoteError>> for LookupOutcome {
    fn from(result: Result<Option<String>, RemoteError>) -> Self {
        match result {
            Ok(Some(text)) => Self::Combined(text),
            Ok(None) => Self::NoCombination,
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// Answers "what do these two elements make?". Enables mocking in tests.
#[async_trait::async_trait]
pub trait CombinationLookup: Send + Sync {
    /// Look up the combination of `first` and `second`.
    ///
    /// `Ok(None)` means the service knows no combination for the pair.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the request fails or the reply is malformed.
    async fn combine(&self, first: &str, second: &str) -> Result<Option<String>, RemoteError>;
}

/// Submits a session score. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ScoreReporter: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the submission is not acknowledged.
    async fn submit(&self, score: u64) -> Result<ScoreReceipt, RemoteError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub(crate) fn build_http(config: &ClientConfig) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeouts.request_secs))
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
        .build()
        .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))
}

/// Read the response body, mapping non-success statuses to [`RemoteError::Response`].
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, RemoteError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| RemoteError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(RemoteError::Response { status: status.as_u16(), body: text });
    }
    Ok(text)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
