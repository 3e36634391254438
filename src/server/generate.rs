//! Combination generation for pairs the recipe book does not know yet.
//!
//! DESIGN
//! ======
//! [`CombinationGenerator`] is the seam the lookup handler calls on a miss;
//! tests drive it with mocks. [`AnthropicGenerator`] is the HTTP
//! implementation against the Messages API. Response parsing lives in the
//! pure `parse_response` so it can be tested without a network.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;

/// Generated names are short: a word or two plus an emoji.
const MAX_OUTPUT_TOKENS: u32 = 15;
const TEMPERATURE: f32 = 0.9;
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You combine two elements or items into one new item. \
Reply with only the new item's name followed directly by one emoji, or two for a complex creation. \
Keep the name simple, avoid compound names, and put no space between the name and the emoji. \
Examples: Stone + Fire -> Lava🌋. Palace + President -> White House🏛️. Water + Earth -> Mud💩.";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while generating a combination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request to the model provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The model provider returned a non-success status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The model answered without any text.
    #[error("model returned no combination")]
    Empty,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Invents the result of combining two elements. Enables mocking in tests.
#[async_trait::async_trait]
pub trait CombinationGenerator: Send + Sync {
    /// Generate the element that `first + second` makes, emoji included.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError`] if the provider call fails or yields no text.
    async fn generate(&self, first: &str, second: &str) -> Result<String, GenerateError>;
}

/// The element name with emoji and punctuation removed: `"Lava🌋"` is `"Lava"`.
#[must_use]
pub fn element_name(result: &str) -> String {
    result
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicGenerator {
    /// # Errors
    ///
    /// Returns `GenerateError::HttpClientBuild` if the client cannot be built.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GenerateError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: format!("{}/messages", config.base_url),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl CombinationGenerator for AnthropicGenerator {
    async fn generate(&self, first: &str, second: &str) -> Result<String, GenerateError> {
        let prompt = format!("{first} + {second}");
        let body = ApiRequest {
            model: &self.model,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            system: SYSTEM_PROMPT,
            messages: [ApiMessage { role: "user", content: &prompt }],
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::ApiRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerateError::ApiRequest(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerateError::ApiResponse { status: status.as_u16(), body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

// =============================================================================
// PARSING
// =============================================================================

/// First non-blank text block, trimmed.
fn parse_response(json: &str) -> Result<String, GenerateError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| GenerateError::ApiParse(e.to_string()))?;
    api.content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        })
        .ok_or(GenerateError::Empty)
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
