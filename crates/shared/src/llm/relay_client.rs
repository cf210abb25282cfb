use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ProviderMessage, RelayErrorResponse, RelayRequest};

pub type RelayFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RelayError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("relay returned an invalid payload: {0}")]
    InvalidPayload(String),
}

/// One round trip to the relay: a prompt goes out, the model's reply text
/// comes back.
pub trait RelayTransport: Send + Sync {
    fn send<'a>(&'a self, request: RelayRequest) -> RelayFuture<'a>;
}

#[derive(Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpRelayClient {
    pub fn new(relay_url: impl Into<String>) -> Result<Self, RelayError> {
        Self::build(relay_url.into(), None)
    }

    pub fn with_timeout(relay_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        Self::build(relay_url.into(), Some(timeout))
    }

    fn build(relay_url: String, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| RelayError::Transport(err.to_string()))?;

        Ok(Self { client, relay_url })
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    async fn send_once(&self, request: RelayRequest) -> Result<String, RelayError> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "relay request could not be sent");
                RelayError::Transport(err.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RelayError::Transport(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RelayErrorResponse>(&body)
                .map(|envelope| envelope.error)
                .ok()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("relay returned status {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "relay returned an error");
            return Err(RelayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ProviderMessage = serde_json::from_str(&body)
            .map_err(|_| RelayError::InvalidPayload("response_json_parse_failed".to_string()))?;
        let text = parsed
            .joined_text()
            .ok_or_else(|| RelayError::InvalidPayload("missing_text_content".to_string()))?;

        debug!(chars = text.chars().count(), "relay reply received");
        Ok(text)
    }
}

impl RelayTransport for HttpRelayClient {
    fn send<'a>(&'a self, request: RelayRequest) -> RelayFuture<'a> {
        Box::pin(self.send_once(request))
    }
}
