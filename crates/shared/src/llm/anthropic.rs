use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::models::RelayRequest;

/// A provider reply, success or not, with the provider's status code.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Best human-readable error carried by a failed reply.
    pub fn error_message(&self) -> String {
        parse_provider_error_message(&self.body)
            .unwrap_or_else(|| format!("upstream returned status {}", self.status.as_u16()))
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("ANTHROPIC_API_KEY is not configured")]
    MissingCredential,
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("failed to build upstream http client: {0}")]
    HttpClient(String),
}

/// Forwards relay bodies to the Messages API with the server-held key. One
/// attempt per call; retries are left to the user.
#[derive(Clone)]
pub struct AnthropicUpstream {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl AnthropicUpstream {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|err| UpstreamError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn forward(&self, request: &RelayRequest) -> Result<UpstreamReply, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)?;

        let request_body = json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system,
            "messages": request.messages,
        });

        let response = self
            .client
            .post(&self.config.messages_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        // Non-JSON bodies (proxies, gateways) are kept as text so the caller
        // can still surface them.
        let body = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

        if status.is_success() {
            debug!(status = status.as_u16(), model = %self.config.model, "upstream reply received");
        } else {
            warn!(status = status.as_u16(), "upstream returned an error");
        }

        Ok(UpstreamReply { status, body })
    }
}

fn parse_provider_error_message(body: &Value) -> Option<String> {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<Value>,
    }

    if let Value::String(text) = body {
        return non_empty(text);
    }

    let envelope = serde_json::from_value::<ProviderErrorEnvelope>(body.clone()).ok()?;
    match envelope.error? {
        Value::String(message) => non_empty(&message),
        Value::Object(details) => details
            .get("message")
            .and_then(Value::as_str)
            .and_then(non_empty)
            .or_else(|| details.get("type").and_then(Value::as_str).and_then(non_empty)),
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use super::UpstreamReply;

    fn reply(status: StatusCode, body: Value) -> UpstreamReply {
        UpstreamReply { status, body }
    }

    #[test]
    fn error_message_prefers_provider_error_message() {
        let failed = reply(
            StatusCode::TOO_MANY_REQUESTS,
            json!({
                "type": "error",
                "error": { "type": "rate_limit_error", "message": "rate limited" }
            }),
        );
        assert!(!failed.is_success());
        assert_eq!(failed.error_message(), "rate limited");
    }

    #[test]
    fn error_message_accepts_flat_string_errors_and_error_types() {
        let flat = reply(StatusCode::BAD_REQUEST, json!({ "error": "bad input" }));
        assert_eq!(flat.error_message(), "bad input");

        let typed_only = reply(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": { "type": "overloaded_error" } }),
        );
        assert_eq!(typed_only.error_message(), "overloaded_error");
    }

    #[test]
    fn error_message_falls_back_to_status_or_raw_text() {
        let opaque = reply(StatusCode::BAD_GATEWAY, json!({ "detail": "?" }));
        assert_eq!(opaque.error_message(), "upstream returned status 502");

        let text = reply(
            StatusCode::BAD_GATEWAY,
            Value::String("  upstream connect error  ".to_string()),
        );
        assert_eq!(text.error_message(), "upstream connect error");
    }
}
