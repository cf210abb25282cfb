use shared::models::{RelayRequest, RelayRole};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(super) enum RelayRequestError {
    #[error("messages must not be empty")]
    NoMessages,
    #[error("the last message must come from the user")]
    LastMessageNotUser,
    #[error("message {0} has empty content")]
    EmptyContent(usize),
    #[error("max_tokens must be between 1 and {0}")]
    MaxTokensOutOfRange(u32),
    #[error("temperature must be between 0 and 1")]
    TemperatureOutOfRange,
}

pub(super) fn validate_relay_request(
    request: &RelayRequest,
    max_tokens_cap: u32,
) -> Result<(), RelayRequestError> {
    let Some(last) = request.messages.last() else {
        return Err(RelayRequestError::NoMessages);
    };
    if last.role != RelayRole::User {
        return Err(RelayRequestError::LastMessageNotUser);
    }
    if let Some(index) = request
        .messages
        .iter()
        .position(|message| message.content.trim().is_empty())
    {
        return Err(RelayRequestError::EmptyContent(index));
    }
    if request.max_tokens == 0 || request.max_tokens > max_tokens_cap {
        return Err(RelayRequestError::MaxTokensOutOfRange(max_tokens_cap));
    }
    if !(0.0..=1.0).contains(&request.temperature) {
        return Err(RelayRequestError::TemperatureOutOfRange);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use shared::models::{RelayMessage, RelayRequest, RelayRole};

    use super::{RelayRequestError, validate_relay_request};

    fn request(messages: Vec<(RelayRole, &str)>) -> RelayRequest {
        RelayRequest {
            max_tokens: 2000,
            temperature: 0.7,
            system: "sys".to_string(),
            messages: messages
                .into_iter()
                .map(|(role, content)| RelayMessage {
                    role,
                    content: content.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_alternating_conversation_ending_with_user() {
        let request = request(vec![
            (RelayRole::User, "make it red"),
            (RelayRole::Assistant, "done"),
            (RelayRole::User, "bigger title"),
        ]);
        assert_eq!(validate_relay_request(&request, 4096), Ok(()));
    }

    #[test]
    fn rejects_empty_or_assistant_terminated_conversations() {
        assert_eq!(
            validate_relay_request(&request(Vec::new()), 4096),
            Err(RelayRequestError::NoMessages)
        );
        assert_eq!(
            validate_relay_request(&request(vec![(RelayRole::Assistant, "hi")]), 4096),
            Err(RelayRequestError::LastMessageNotUser)
        );
        assert_eq!(
            validate_relay_request(
                &request(vec![(RelayRole::User, " "), (RelayRole::User, "ok")]),
                4096
            ),
            Err(RelayRequestError::EmptyContent(0))
        );
    }

    #[test]
    fn enforces_token_cap_and_temperature_range() {
        let mut zero_tokens = request(vec![(RelayRole::User, "hi")]);
        zero_tokens.max_tokens = 0;
        assert_eq!(
            validate_relay_request(&zero_tokens, 4096),
            Err(RelayRequestError::MaxTokensOutOfRange(4096))
        );

        let mut at_cap = request(vec![(RelayRole::User, "hi")]);
        at_cap.max_tokens = 3000;
        assert_eq!(validate_relay_request(&at_cap, 3000), Ok(()));
        assert!(validate_relay_request(&at_cap, 2999).is_err());

        let mut hot = request(vec![(RelayRole::User, "hi")]);
        hot.temperature = 1.5;
        assert_eq!(
            validate_relay_request(&hot, 4096),
            Err(RelayRequestError::TemperatureOutOfRange)
        );

        hot.temperature = f32::NAN;
        assert_eq!(
            validate_relay_request(&hot, 4096),
            Err(RelayRequestError::TemperatureOutOfRange)
        );
    }
}
