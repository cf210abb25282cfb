pub mod anthropic;
pub mod prompts;
pub mod relay_client;

pub use anthropic::{AnthropicUpstream, UpstreamError, UpstreamReply};
pub use prompts::{
    ASSISTANT_TEMPERATURE, AssistantMode, EXPLANATION_MARKER, HTML_MARKER, JSON_MARKER,
    PromptTemplate, UnknownMode, shrink_config_for_prompt, template_for_mode,
};
pub use relay_client::{HttpRelayClient, RelayError, RelayFuture, RelayTransport};
