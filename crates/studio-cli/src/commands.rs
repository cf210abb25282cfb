use serde_json::Value;
use shared::llm::AssistantMode;
use shared::templates::TemplateKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Templates,
    Template(TemplateKind),
    Mode(AssistantMode),
    Show,
    Set { field: String, value: Value },
    Reset,
    History,
    Help,
    Quit,
    Instruction(String),
    Empty,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command: {0} (try /help)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown template '{0}' (see /templates)")]
    InvalidTemplate(String),
    #[error("unknown mode '{0}' (design, code or chat)")]
    InvalidMode(String),
}

pub fn parse_line(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Instruction(line.to_string()));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    match name {
        "templates" => Ok(Command::Templates),
        "template" => {
            if argument.is_empty() {
                return Err(CommandError::Usage("/template <id>"));
            }
            argument
                .parse()
                .map(Command::Template)
                .map_err(|_| CommandError::InvalidTemplate(argument.to_string()))
        }
        "mode" => {
            if argument.is_empty() {
                return Err(CommandError::Usage("/mode <design|code|chat>"));
            }
            argument
                .parse()
                .map(Command::Mode)
                .map_err(|_| CommandError::InvalidMode(argument.to_string()))
        }
        "show" => Ok(Command::Show),
        "set" => {
            let Some((field, raw)) = argument.split_once(char::is_whitespace) else {
                return Err(CommandError::Usage("/set <field> <value>"));
            };
            Ok(Command::Set {
                field: field.to_string(),
                value: parse_field_value(raw.trim()),
            })
        }
        "reset" => Ok(Command::Reset),
        "history" => Ok(Command::History),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(format!("/{other}"))),
    }
}

/// JSON literals keep their type (`72`, `true`, `"a b"`); anything else is
/// taken as plain text and left to the store to coerce.
fn parse_field_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
