use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub role: RelayRole,
    pub content: String,
}

/// Body accepted by the relay endpoint. The provider model and credential are
/// supplied server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: String,
    pub messages: Vec<RelayMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// The subset of a provider message the studio reads back out of a relayed
/// success body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMessage {
    #[serde(default)]
    pub content: Vec<ProviderContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ProviderMessage {
    pub fn joined_text(&self) -> Option<String> {
        let parts = self
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ProviderMessage, RelayRequest, RelayRole};

    #[test]
    fn relay_request_uses_lowercase_roles_on_the_wire() {
        let request: RelayRequest = serde_json::from_value(json!({
            "max_tokens": 2000,
            "temperature": 0.7,
            "system": "sys",
            "messages": [{ "role": "user", "content": "hello" }]
        }))
        .expect("relay body should parse");

        assert_eq!(request.messages[0].role, RelayRole::User);
        let encoded = serde_json::to_value(&request).expect("relay body should encode");
        assert_eq!(encoded["messages"][0]["role"], "user");
    }

    #[test]
    fn provider_message_joins_text_blocks_and_skips_others() {
        let message: ProviderMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "[설명] done." },
                { "type": "tool_use", "id": "tool_1", "name": "noop", "input": {} },
                { "type": "text", "text": "\n[JSON] {}" }
            ]
        }))
        .expect("provider message should parse");

        assert_eq!(message.joined_text().as_deref(), Some("[설명] done.\n[JSON] {}"));
    }

    #[test]
    fn provider_message_without_text_yields_none() {
        let message: ProviderMessage =
            serde_json::from_value(json!({ "content": [] })).expect("empty content should parse");
        assert!(message.joined_text().is_none());
    }
}
