//! Configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LLM_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),

    /// `LLM_API_KEY_ENV` names a variable that is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Where the combination lookup and score endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl ClientConfig {
    /// Build client config from environment variables.
    ///
    /// Optional:
    /// - `ESSENTIA_API_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `ESSENTIA_REQUEST_TIMEOUT_SECS`: default 10
    /// - `ESSENTIA_CONNECT_TIMEOUT_SECS`: default 5
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("ESSENTIA_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = Timeouts {
            request_secs: env_parse("ESSENTIA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("ESSENTIA_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self { base_url, timeouts }
    }
}

/// Model provider used to invent combinations the recipe book lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: Timeouts,
}

impl GeneratorConfig {
    /// Build generator config from environment variables. `Ok(None)` when
    /// `LLM_API_KEY_ENV` is unset, which leaves generation off.
    ///
    /// Optional:
    /// - `LLM_API_KEY_ENV`: names the env var containing the key
    /// - `LLM_MODEL`: default `claude-3-5-haiku-20241022`
    /// - `LLM_BASE_URL`: default `https://api.anthropic.com/v1`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` if the named key variable is unset.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(key_var) = std::env::var("LLM_API_KEY_ENV") else {
            return Ok(None);
        };
        let api_key = std::env::var(&key_var).map_err(|_| ConfigError::MissingApiKey { var: key_var.clone() })?;
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = Timeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };
        Ok(Some(Self { api_key, model, base_url, timeouts }))
    }
}

/// Element server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON file of `{ element1, element2, result }` recipes to seed from.
    pub recipes_path: Option<PathBuf>,
    /// Unknown pairs answer `null` when absent.
    pub generator: Option<GeneratorConfig>,
}

impl ServerConfig {
    /// Build server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `RECIPES_PATH`: no seed recipes when absent
    /// - generator settings, see [`GeneratorConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if `PORT` is not a valid port number, or
    /// `ConfigError::MissingApiKey` if the generator key is named but unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").as_deref().unwrap_or(""))?;
        let recipes_path = std::env::var_os("RECIPES_PATH").map(PathBuf::from);
        let generator = GeneratorConfig::from_env()?;
        Ok(Self { port, recipes_path, generator })
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    if raw.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    raw.parse::<u16>()
        .map_err(|e| ConfigError::Parse(format!("invalid PORT '{raw}': {e}")))
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(v) => v.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
