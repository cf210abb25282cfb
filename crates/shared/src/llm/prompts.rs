use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::templates::{RenderMode, TemplateConfig, template_schema};

pub const EXPLANATION_MARKER: &str = "[설명]";
pub const JSON_MARKER: &str = "[JSON]";
pub const HTML_MARKER: &str = "[HTML]";

pub const ASSISTANT_TEMPERATURE: f32 = 0.7;
/// Text fields longer than this are shortened before they are embedded in a
/// field-config prompt.
pub const PROMPT_TEXT_LIMIT: usize = 50;

const FIELD_CONFIG_MAX_TOKENS: u32 = 2000;
const HTML_DIRECT_MAX_TOKENS: u32 = 3000;
const CODE_MAX_TOKENS: u32 = 3000;
const CHAT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    Design,
    Code,
    Chat,
}

#[derive(Debug, Error)]
#[error("unknown assistant mode '{0}' (expected design, code or chat)")]
pub struct UnknownMode(pub String);

impl AssistantMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Code => "code",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for AssistantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistantMode {
    type Err = UnknownMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "design" => Ok(Self::Design),
            "code" => Ok(Self::Code),
            "chat" => Ok(Self::Chat),
            _ => Err(UnknownMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub mode: AssistantMode,
    pub render_mode: RenderMode,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

pub fn template_for_mode(mode: AssistantMode, config: &TemplateConfig) -> PromptTemplate {
    let render_mode = config.kind().render_mode();
    let (system_prompt, max_tokens) = match (mode, render_mode) {
        (AssistantMode::Design, RenderMode::FieldConfig) => {
            (field_config_prompt(config), FIELD_CONFIG_MAX_TOKENS)
        }
        (AssistantMode::Design, RenderMode::HtmlDirect) => {
            (html_direct_prompt(config), HTML_DIRECT_MAX_TOKENS)
        }
        (AssistantMode::Code, _) => (code_prompt(config), CODE_MAX_TOKENS),
        (AssistantMode::Chat, _) => (chat_prompt(config), CHAT_MAX_TOKENS),
    };

    PromptTemplate {
        mode,
        render_mode,
        system_prompt,
        max_tokens,
        temperature: ASSISTANT_TEMPERATURE,
    }
}

pub fn shrink_config_for_prompt(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) if text.chars().count() > PROMPT_TEXT_LIMIT => {
                    let mut shortened = text.chars().take(PROMPT_TEXT_LIMIT).collect::<String>();
                    shortened.push_str("...");
                    Value::String(shortened)
                }
                other => other,
            };
            (key, value)
        })
        .collect()
}

fn template_header(config: &TemplateConfig) -> String {
    let kind = config.kind();
    let ratio = kind.aspect_ratio();
    let (width, height) = ratio.canvas_size();
    format!(
        "Template: {} ({}), canvas {width}x{height} ({}).",
        kind.display_name(),
        kind.as_str(),
        ratio.label()
    )
}

fn field_config_prompt(config: &TemplateConfig) -> String {
    let current = Value::Object(shrink_config_for_prompt(config.fields()));
    let schema = template_schema(config.kind());

    format!(
        "You are the design assistant of a thumbnail studio. The user describes changes to a \
template in plain language and you translate them into field updates.\n\
{header}\n\
Field schema:\n{schema}\n\
Current configuration (long text is shortened with ...):\n{current}\n\n\
Reply in exactly this format:\n\
{EXPLANATION_MARKER} one or two sentences describing what you changed\n\
{JSON_MARKER} a single JSON object containing only the fields you changed\n\n\
Rules:\n\
- Use only field names that appear in the current configuration.\n\
- Colors are hex strings such as #3B82F6. Booleans are true or false.\n\
- Enumerated fields must use one of the values listed in the schema.\n\
- If the user asks a question instead of requesting a change, answer briefly and omit the \
{JSON_MARKER} section.",
        header = template_header(config),
    )
}

fn html_direct_prompt(config: &TemplateConfig) -> String {
    let markup = config.html().unwrap_or_default();

    format!(
        "You are the design assistant of a thumbnail studio. This template is rendered from raw \
HTML that you rewrite in full on every change.\n\
{header}\n\
Current markup:\n{markup}\n\n\
Reply in exactly this format:\n\
{EXPLANATION_MARKER} one or two sentences describing what you changed\n\
{HTML_MARKER} the complete updated markup\n\n\
Rules:\n\
- Return one root element sized exactly to the canvas.\n\
- Use inline styles only; no scripts, external stylesheets or remote fonts.\n\
- Keep every part of the design the user did not ask to change.\n\
- If the user asks a question instead of requesting a change, answer briefly and omit the \
{HTML_MARKER} section.",
        header = template_header(config),
    )
}

fn code_prompt(config: &TemplateConfig) -> String {
    format!(
        "You are a front-end engineer helping a user of a thumbnail studio.\n\
{header}\n\
Answer questions about how the template is built, and provide HTML/CSS snippets in fenced \
code blocks when they help. Do not claim to have changed the template.",
        header = template_header(config),
    )
}

fn chat_prompt(config: &TemplateConfig) -> String {
    format!(
        "You are a friendly graphic design consultant inside a thumbnail studio.\n\
{header}\n\
Give concise advice on copy, color, composition and typography. Do not output JSON or HTML; \
the user applies changes separately.",
        header = template_header(config),
    )
}
