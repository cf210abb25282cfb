use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::bridge::{AssistantBridge, BridgeError, BridgeRequest};
use super::reply_parser::{AssistantPayload, ParsedReply};
use crate::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_TURNS};
use crate::conversation::ConversationHistory;
use crate::llm::{AssistantMode, RelayTransport};
use crate::store::{ConfigStore, DeltaOutcome};
use crate::templates::{TemplateConfig, TemplateKind};

pub const MAX_INSTRUCTION_CHARS: usize = 500;
pub const ERROR_TURN_PREFIX: &str = "Error: ";

#[derive(Debug, Error)]
pub enum InstructionError {
    #[error("instruction is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppliedChange {
    Fields(DeltaOutcome),
    Html,
}

/// How one instruction ended. `Applied` and `Replied` are the parsed
/// with/without payload cases; `Failed` covers relay errors and unusable
/// payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionOutcome {
    Applied {
        explanation: String,
        change: AppliedChange,
    },
    Replied {
        text: String,
    },
    Failed {
        message: String,
    },
}

/// One editing session: a live record plus its conversation. Taking `&mut
/// self` for `submit` keeps at most one instruction in flight.
#[derive(Debug)]
pub struct EditingSession {
    store: ConfigStore,
    history: ConversationHistory,
    recent_turns: usize,
}

impl EditingSession {
    pub fn new(kind: TemplateKind) -> Self {
        Self::with_limits(kind, DEFAULT_HISTORY_LIMIT, DEFAULT_RECENT_TURNS)
    }

    pub fn with_limits(kind: TemplateKind, history_limit: usize, recent_turns: usize) -> Self {
        Self {
            store: ConfigStore::new(kind),
            history: ConversationHistory::with_capacity(history_limit),
            recent_turns,
        }
    }

    pub fn kind(&self) -> TemplateKind {
        self.store.kind()
    }

    pub fn config(&self) -> TemplateConfig {
        self.store.get()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Direct user edit; does not touch the conversation.
    pub fn edit(&mut self, delta: &Map<String, Value>) -> DeltaOutcome {
        self.store.set(delta)
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }

    pub fn switch_template(&mut self, kind: TemplateKind) {
        self.store = ConfigStore::new(kind);
        self.history.clear();
    }

    pub async fn submit<T>(
        &mut self,
        bridge: &AssistantBridge<T>,
        instruction: &str,
        mode: AssistantMode,
    ) -> Result<InstructionOutcome, InstructionError>
    where
        T: RelayTransport,
    {
        let instruction = normalize_instruction(instruction).ok_or(InstructionError::Empty)?;

        let config = self.store.get();
        let reply = bridge
            .respond(BridgeRequest {
                instruction: &instruction,
                mode,
                config: &config,
                recent_turns: self.history.recent(self.recent_turns),
            })
            .await;

        self.history.push_user(instruction);

        let outcome = match reply {
            Ok(ParsedReply::Conversational { text }) => {
                self.history.push_assistant(text.clone());
                InstructionOutcome::Replied { text }
            }
            Ok(ParsedReply::WithPayload {
                explanation,
                payload,
            }) => self.apply_payload(explanation, payload),
            Err(BridgeError::Relay(err)) => self.fail(err.to_string()),
            Err(BridgeError::MalformedPayload(err)) => self.fail(err.to_string()),
        };

        Ok(outcome)
    }

    fn apply_payload(&mut self, explanation: String, payload: AssistantPayload) -> InstructionOutcome {
        match payload {
            AssistantPayload::ConfigDelta(fields) => {
                let delta = self.store.set(&fields);
                if !delta.changed() {
                    let skipped = delta
                        .rejected
                        .iter()
                        .map(|item| format!("{} ({})", item.field, item.reason))
                        .collect::<Vec<_>>()
                        .join(", ");
                    return self.fail(format!(
                        "the suggested changes could not be applied: {skipped}"
                    ));
                }
                if !delta.rejected.is_empty() {
                    warn!(
                        template = %self.kind(),
                        rejected = ?delta.rejected,
                        "assistant suggested fields that were refused"
                    );
                }
                info!(template = %self.kind(), applied = ?delta.applied, "assistant change applied");
                self.history.push_assistant(explanation.clone());
                InstructionOutcome::Applied {
                    explanation,
                    change: AppliedChange::Fields(delta),
                }
            }
            AssistantPayload::Html { html } => match self.store.replace_html(&html) {
                Ok(()) => {
                    info!(template = %self.kind(), chars = html.len(), "assistant markup applied");
                    self.history.push_assistant(explanation.clone());
                    InstructionOutcome::Applied {
                        explanation,
                        change: AppliedChange::Html,
                    }
                }
                Err(err) => self.fail(err.to_string()),
            },
        }
    }

    fn fail(&mut self, message: String) -> InstructionOutcome {
        warn!(template = %self.kind(), error = %message, "assistant instruction failed");
        self.history
            .push_error(format!("{ERROR_TURN_PREFIX}{message}"));
        InstructionOutcome::Failed { message }
    }
}

fn normalize_instruction(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_INSTRUCTION_CHARS).collect())
}
