use thiserror::Error;
use tracing::{debug, info};

use super::reply_parser::{MalformedPayload, ParsedReply, conversational_reply, parse_design_reply};
use crate::conversation::{ConversationTurn, TurnRole};
use crate::llm::{AssistantMode, RelayError, RelayTransport, template_for_mode};
use crate::models::{RelayMessage, RelayRequest, RelayRole};
use crate::templates::TemplateConfig;

#[derive(Debug, Clone)]
pub struct BridgeRequest<'a> {
    pub instruction: &'a str,
    pub mode: AssistantMode,
    pub config: &'a TemplateConfig,
    /// Oldest first; usually the newest few turns of the session.
    pub recent_turns: Vec<&'a ConversationTurn>,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),
}

/// Turns one instruction into a parsed reply. Holds no session state; the
/// caller owns the record and the conversation.
#[derive(Debug, Clone)]
pub struct AssistantBridge<T> {
    transport: T,
}

impl<T> AssistantBridge<T>
where
    T: RelayTransport,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn relay_request_for(request: &BridgeRequest<'_>) -> RelayRequest {
        let template = template_for_mode(request.mode, request.config);

        let mut messages = request
            .recent_turns
            .iter()
            .filter(|turn| !turn.is_error)
            .skip_while(|turn| turn.role == TurnRole::Assistant)
            .map(|turn| RelayMessage {
                role: match turn.role {
                    TurnRole::User => RelayRole::User,
                    TurnRole::Assistant => RelayRole::Assistant,
                },
                content: turn.text.clone(),
            })
            .collect::<Vec<_>>();
        messages.push(RelayMessage {
            role: RelayRole::User,
            content: request.instruction.to_string(),
        });

        RelayRequest {
            max_tokens: template.max_tokens,
            temperature: template.temperature,
            system: template.system_prompt,
            messages,
        }
    }

    pub async fn respond(&self, request: BridgeRequest<'_>) -> Result<ParsedReply, BridgeError> {
        let kind = request.config.kind();
        let relay_request = Self::relay_request_for(&request);
        info!(
            template = %kind,
            mode = %request.mode,
            history_turns = relay_request.messages.len() - 1,
            max_tokens = relay_request.max_tokens,
            "sending assistant instruction"
        );

        let reply_text = self.transport.send(relay_request).await?;

        let parsed = match request.mode {
            AssistantMode::Design => parse_design_reply(&reply_text, kind.render_mode())?,
            AssistantMode::Code | AssistantMode::Chat => conversational_reply(&reply_text),
        };
        debug!(
            with_payload = matches!(parsed, ParsedReply::WithPayload { .. }),
            "assistant reply parsed"
        );
        Ok(parsed)
    }
}
