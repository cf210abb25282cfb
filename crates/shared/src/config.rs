use thiserror::Error;
use url::Url;

use crate::config_env::{
    optional_trimmed_env, parse_optional_u64_env, parse_u32_env, parse_usize_env,
};

const DEFAULT_RELAY_BIND_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS_CAP: u32 = 4096;

const DEFAULT_STUDIO_RELAY_URL: &str = "http://127.0.0.1:8787/api/claude";
pub const DEFAULT_HISTORY_LIMIT: usize = 15;
pub const DEFAULT_RECENT_TURNS: usize = 5;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub upstream: UpstreamConfig,
    pub max_tokens_cap: u32,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Absent keys are tolerated at startup; every relay call then fails with
    /// a missing-credential error instead of reaching the provider.
    pub api_key: Option<String>,
    pub messages_url: String,
    pub model: String,
    pub api_version: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub relay_url: String,
    pub history_limit: usize,
    pub recent_turns: usize,
    /// Unset means the relay call waits as long as the network stack does.
    pub relay_timeout_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let messages_url = optional_trimmed_env("ANTHROPIC_MESSAGES_URL")
            .unwrap_or_else(|| DEFAULT_ANTHROPIC_MESSAGES_URL.to_string());
        require_http_url("ANTHROPIC_MESSAGES_URL", &messages_url)?;

        let max_tokens_cap = parse_u32_env("RELAY_MAX_TOKENS_CAP", DEFAULT_MAX_TOKENS_CAP)?;
        if max_tokens_cap == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "RELAY_MAX_TOKENS_CAP must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("RELAY_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_RELAY_BIND_ADDR.to_string()),
            upstream: UpstreamConfig {
                api_key: optional_trimmed_env("ANTHROPIC_API_KEY"),
                messages_url,
                model: optional_trimmed_env("ANTHROPIC_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
                api_version: optional_trimmed_env("ANTHROPIC_VERSION")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_VERSION.to_string()),
                timeout_ms: parse_optional_u64_env("RELAY_UPSTREAM_TIMEOUT_MS")?,
            },
            max_tokens_cap,
        })
    }
}

impl UpstreamConfig {
    pub fn new(api_key: Option<String>, messages_url: impl Into<String>) -> Self {
        Self {
            api_key,
            messages_url: messages_url.into(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            api_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            timeout_ms: None,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let relay_url = optional_trimmed_env("STUDIO_RELAY_URL")
            .unwrap_or_else(|| DEFAULT_STUDIO_RELAY_URL.to_string());
        require_http_url("STUDIO_RELAY_URL", &relay_url)?;

        let history_limit = parse_usize_env("STUDIO_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        let recent_turns = parse_usize_env("STUDIO_RECENT_TURNS", DEFAULT_RECENT_TURNS)?;
        let relay_timeout_ms = parse_optional_u64_env("STUDIO_RELAY_TIMEOUT_MS")?;
        if history_limit < 2 {
            return Err(ConfigError::InvalidConfiguration(
                "STUDIO_HISTORY_LIMIT must keep at least one user/assistant pair".to_string(),
            ));
        }

        Ok(Self {
            relay_url,
            history_limit,
            recent_turns,
            relay_timeout_ms,
        })
    }
}

/// Loads `.env` from the working directory when present. A missing file is
/// not an error; a malformed one is.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

pub(crate) fn require_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value)
        .map_err(|_| ConfigError::InvalidConfiguration(format!("{key} is not a valid URL")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidConfiguration(format!(
            "{key} must start with http:// or https://"
        ))),
    }
}
