use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::templates::{
    RenderMode, TemplateConfig, TemplateKind, field_choices, validate_config_value,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedField {
    pub field: String,
    pub reason: String,
}

/// Result of merging a partial record: which keys were written and which were
/// refused. Refused keys leave their previous value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeltaOutcome {
    pub applied: Vec<String>,
    pub rejected: Vec<RejectedField>,
}

impl DeltaOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} does not accept generated markup")]
    HtmlNotSupported(TemplateKind),
    #[error("generated markup is empty")]
    EmptyHtml,
    #[error("generated markup was refused: {0}")]
    Rejected(String),
}

/// Holds the live record for one template instance and publishes every change
/// to subscribers.
#[derive(Debug)]
pub struct ConfigStore {
    kind: TemplateKind,
    sender: watch::Sender<TemplateConfig>,
}

impl ConfigStore {
    pub fn new(kind: TemplateKind) -> Self {
        let (sender, _) = watch::channel(kind.default_config());
        Self { kind, sender }
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn get(&self) -> TemplateConfig {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TemplateConfig> {
        self.sender.subscribe()
    }

    /// Merges `delta` key by key. Each key must already exist on the record;
    /// its value is coerced to the current value's type and the resulting
    /// record must still deserialize and validate.
    pub fn set(&mut self, delta: &Map<String, Value>) -> DeltaOutcome {
        let mut fields = self.get().fields();
        let mut outcome = DeltaOutcome::default();

        for (field, incoming) in delta {
            match self.try_field(&fields, field, incoming) {
                Ok(value) => {
                    fields.insert(field.clone(), value);
                    outcome.applied.push(field.clone());
                }
                Err(reason) => outcome.rejected.push(RejectedField {
                    field: field.clone(),
                    reason,
                }),
            }
        }

        if outcome.changed() {
            match TemplateConfig::from_fields(self.kind, fields) {
                Ok(config) => {
                    self.sender.send_replace(config);
                }
                Err(err) => {
                    // Every key was checked on its own; a combined failure means
                    // nothing from this delta is trustworthy.
                    let reason = err.to_string();
                    outcome.rejected.extend(outcome.applied.drain(..).map(|field| {
                        RejectedField {
                            field,
                            reason: reason.clone(),
                        }
                    }));
                }
            }
        }

        debug!(
            template = %self.kind,
            applied = outcome.applied.len(),
            rejected = outcome.rejected.len(),
            "config delta merged"
        );
        outcome
    }

    pub fn replace_html(&mut self, html: &str) -> Result<(), StoreError> {
        if self.kind.render_mode() != RenderMode::HtmlDirect {
            return Err(StoreError::HtmlNotSupported(self.kind));
        }
        let trimmed = html.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyHtml);
        }

        let mut fields = Map::new();
        fields.insert("html".to_string(), Value::String(trimmed.to_string()));
        let outcome = self.set(&fields);
        match outcome.rejected.into_iter().next() {
            Some(rejected) => Err(StoreError::Rejected(rejected.reason)),
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) {
        self.sender.send_replace(self.kind.default_config());
    }

    fn try_field(
        &self,
        fields: &Map<String, Value>,
        field: &str,
        incoming: &Value,
    ) -> Result<Value, String> {
        let current = fields
            .get(field)
            .ok_or_else(|| format!("{} has no field named '{field}'", self.kind))?;
        let coerced = match coerce_value(current, incoming)? {
            Value::String(text) => Value::String(canonical_choice(self.kind, field, text)),
            other => other,
        };

        let mut candidate = fields.clone();
        candidate.insert(field.to_string(), coerced.clone());
        validate_config_value(self.kind, &Value::Object(candidate.clone()))
            .map_err(|err| err.to_string())?;
        TemplateConfig::from_fields(self.kind, candidate).map_err(|err| err.to_string())?;

        Ok(coerced)
    }
}

/// Maps enum text onto its declared spelling so `"Neon"` lands as `neon`.
fn canonical_choice(kind: TemplateKind, field: &str, text: String) -> String {
    let wanted = text.trim();
    field_choices(kind, field)
        .into_iter()
        .find(|choice| choice.eq_ignore_ascii_case(wanted))
        .unwrap_or(text)
}

fn coerce_value(current: &Value, incoming: &Value) -> Result<Value, String> {
    match current {
        Value::Bool(_) => coerce_bool(incoming),
        Value::Number(number) => coerce_number(number, incoming),
        Value::String(_) => match incoming {
            Value::String(text) => Ok(Value::String(text.clone())),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            Value::Bool(flag) => Ok(Value::String(flag.to_string())),
            _ => Err("expected text".to_string()),
        },
        _ => Err("field cannot be edited".to_string()),
    }
}

fn coerce_bool(incoming: &Value) -> Result<Value, String> {
    match incoming {
        Value::Bool(flag) => Ok(Value::Bool(*flag)),
        Value::Number(number) => match number.as_u64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err("expected true or false".to_string()),
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "show" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "hide" => Ok(Value::Bool(false)),
            _ => Err("expected true or false".to_string()),
        },
        _ => Err("expected true or false".to_string()),
    }
}

fn coerce_number(current: &Number, incoming: &Value) -> Result<Value, String> {
    let parsed = match incoming {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| "expected a number".to_string())?,
        Value::String(text) => text
            .trim()
            .trim_end_matches("px")
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| "expected a number".to_string())?,
        _ => return Err("expected a number".to_string()),
    };

    if !parsed.is_finite() {
        return Err("expected a finite number".to_string());
    }

    if current.is_u64() {
        let rounded = parsed.round();
        if rounded < 0.0 {
            return Err("expected a non-negative whole number".to_string());
        }
        return Ok(Value::Number(Number::from(rounded as u64)));
    }

    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| "expected a finite number".to_string())
}
