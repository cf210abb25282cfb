use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm::{EXPLANATION_MARKER, HTML_MARKER, JSON_MARKER};
use crate::templates::RenderMode;

/// Used when the model sends a payload without saying what it did.
pub const DEFAULT_APPLIED_EXPLANATION: &str = "Applied the requested change.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum AssistantPayload {
    #[serde(rename = "config-delta")]
    ConfigDelta(Map<String, Value>),
    #[serde(rename = "html-direct")]
    Html { html: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    WithPayload {
        explanation: String,
        payload: AssistantPayload,
    },
    Conversational {
        text: String,
    },
}

impl ParsedReply {
    pub fn text(&self) -> &str {
        match self {
            Self::WithPayload { explanation, .. } => explanation,
            Self::Conversational { text } => text,
        }
    }
}

/// The reply announced a payload section that could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct MalformedPayload {
    pub explanation: String,
    pub reason: String,
}

static EXPLANATION_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[설명\]\s*(.*?)\s*(?:\[JSON\]|\[HTML\]|\z)")
        .expect("explanation pattern should compile")
});

static JSON_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[JSON\]\s*(.*)").expect("json pattern should compile"));

static HTML_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[HTML\]\s*(.*)").expect("html pattern should compile"));

static BARE_HTML_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<[a-zA-Z][a-zA-Z0-9-]*(?:\s[^>]*)?>.*</[a-zA-Z][a-zA-Z0-9-]*\s*>")
        .expect("bare html pattern should compile")
});

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*").expect("fence pattern should compile"));

/// Reply handling for code and chat modes: the text is shown as-is.
pub fn conversational_reply(text: &str) -> ParsedReply {
    ParsedReply::Conversational {
        text: text.to_string(),
    }
}

/// Splits a design-mode reply into an explanation and, when present, a
/// payload for the given render mode.
pub fn parse_design_reply(
    text: &str,
    render_mode: RenderMode,
) -> Result<ParsedReply, MalformedPayload> {
    let explanation = explanation_section(text);

    let marked = match render_mode {
        RenderMode::FieldConfig => marked_json(text, explanation.as_deref())?,
        RenderMode::HtmlDirect => marked_html(text, explanation.as_deref())?,
    };
    if let Some(reply) = marked {
        return Ok(reply);
    }

    let fallback = match render_mode {
        RenderMode::FieldConfig => bare_json(text),
        RenderMode::HtmlDirect => bare_html(text),
    };
    if let Some((payload, start)) = fallback {
        // Without a payload marker the explanation section runs to the end of
        // the reply; keep only what precedes the payload.
        let prefix = &text[..start];
        let explanation = if prefix.contains(EXPLANATION_MARKER) {
            explanation_section(prefix)
        } else {
            explanation
        }
        .unwrap_or_else(|| explanation_before(text, start));
        return Ok(ParsedReply::WithPayload {
            explanation,
            payload,
        });
    }

    Ok(ParsedReply::Conversational {
        text: explanation.unwrap_or_else(|| text.to_string()),
    })
}

fn marked_json(
    text: &str,
    explanation: Option<&str>,
) -> Result<Option<ParsedReply>, MalformedPayload> {
    let Some(captures) = JSON_SECTION.captures(text) else {
        return Ok(None);
    };
    let marker_start = captures.get(0).map_or(0, |m| m.start());
    let explanation = explanation
        .map(ToString::to_string)
        .unwrap_or_else(|| explanation_before(text, marker_start));
    let section = captures.get(1).map_or("", |m| m.as_str());

    let malformed = |reason: String| MalformedPayload {
        explanation: explanation.clone(),
        reason,
    };

    let (parsed, _) = leading_json_value(section).ok_or_else(|| {
        malformed(format!("the {JSON_MARKER} section does not contain a JSON object"))
    })?;
    let value = parsed
        .map_err(|err| malformed(format!("the {JSON_MARKER} section is not valid JSON: {err}")))?;
    let Value::Object(fields) = value else {
        return Err(malformed(format!(
            "the {JSON_MARKER} section must be a JSON object"
        )));
    };

    Ok(Some(ParsedReply::WithPayload {
        explanation,
        payload: AssistantPayload::ConfigDelta(fields),
    }))
}

fn marked_html(
    text: &str,
    explanation: Option<&str>,
) -> Result<Option<ParsedReply>, MalformedPayload> {
    let Some(captures) = HTML_SECTION.captures(text) else {
        return Ok(None);
    };
    let marker_start = captures.get(0).map_or(0, |m| m.start());
    let explanation = explanation
        .map(ToString::to_string)
        .unwrap_or_else(|| explanation_before(text, marker_start));
    let section = captures.get(1).map_or("", |m| m.as_str());

    let Some(html) = angle_span(section) else {
        return Err(MalformedPayload {
            explanation,
            reason: format!("the {HTML_MARKER} section does not contain markup"),
        });
    };

    Ok(Some(ParsedReply::WithPayload {
        explanation,
        payload: AssistantPayload::Html {
            html: html.to_string(),
        },
    }))
}

/// Speculative: a JSON-looking span without a marker only counts when it
/// parses as an object.
fn bare_json(text: &str) -> Option<(AssistantPayload, usize)> {
    match leading_json_value(text)? {
        (Ok(Value::Object(fields)), start) => Some((AssistantPayload::ConfigDelta(fields), start)),
        _ => None,
    }
}

fn bare_html(text: &str) -> Option<(AssistantPayload, usize)> {
    let found = BARE_HTML_SPAN.find(text)?;
    Some((
        AssistantPayload::Html {
            html: found.as_str().trim().to_string(),
        },
        found.start(),
    ))
}

/// Reads exactly one JSON value starting at the first `{`; anything after it
/// is ignored. Returns the value and the byte offset it started at.
fn leading_json_value(section: &str) -> Option<(Result<Value, serde_json::Error>, usize)> {
    let start = section.find('{')?;
    let parsed = serde_json::Deserializer::from_str(&section[start..])
        .into_iter::<Value>()
        .next()?;
    Some((parsed, start))
}

fn angle_span(section: &str) -> Option<&str> {
    let start = section.find('<')?;
    let end = section.rfind('>')?;
    (end > start).then(|| section[start..=end].trim())
}

fn explanation_section(text: &str) -> Option<String> {
    EXPLANATION_SECTION
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|section| section.as_str().trim().to_string())
        .filter(|section| !section.is_empty())
}

fn explanation_before(text: &str, end: usize) -> String {
    let prefix = CODE_FENCE.replace_all(&text[..end], "");
    let prefix = prefix.replace(EXPLANATION_MARKER, "");
    let trimmed = prefix.trim();
    if trimmed.is_empty() {
        DEFAULT_APPLIED_EXPLANATION.to_string()
    } else {
        trimmed.to_string()
    }
}
