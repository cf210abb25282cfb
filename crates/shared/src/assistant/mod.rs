pub mod bridge;
pub mod reply_parser;
pub mod session;

pub use bridge::{AssistantBridge, BridgeError, BridgeRequest};
pub use reply_parser::{
    AssistantPayload, DEFAULT_APPLIED_EXPLANATION, MalformedPayload, ParsedReply,
    conversational_reply, parse_design_reply,
};
pub use session::{
    AppliedChange, ERROR_TURN_PREFIX, EditingSession, InstructionError, InstructionOutcome,
    MAX_INSTRUCTION_CHARS,
};
