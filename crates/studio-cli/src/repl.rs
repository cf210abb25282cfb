use std::io;

use serde_json::{Map, Value};
use shared::assistant::{
    AppliedChange, AssistantBridge, EditingSession, InstructionError, InstructionOutcome,
};
use shared::conversation::TurnRole;
use shared::llm::{AssistantMode, RelayTransport};
use shared::store::DeltaOutcome;
use shared::templates::{TemplateConfig, TemplateKind};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::debug;

use crate::commands::{Command, parse_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

pub struct Studio<T> {
    session: EditingSession,
    bridge: AssistantBridge<T>,
    mode: AssistantMode,
    preview: watch::Receiver<TemplateConfig>,
}

impl<T> Studio<T>
where
    T: RelayTransport,
{
    pub fn new(session: EditingSession, bridge: AssistantBridge<T>, mode: AssistantMode) -> Self {
        let preview = session.store().subscribe();
        Self {
            session,
            bridge,
            mode,
            preview,
        }
    }

    pub fn mode(&self) -> AssistantMode {
        self.mode
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn banner(&self) -> String {
        format!(
            "{}\nmode: {} | type /help for commands",
            describe_template(self.session.kind()),
            self.mode
        )
    }

    pub async fn execute(&mut self, command: Command) -> (String, Step) {
        let output = match command {
            Command::Empty => String::new(),
            Command::Quit => return ("bye".to_string(), Step::Quit),
            Command::Help => HELP_TEXT.to_string(),
            Command::Templates => self.render_templates(),
            Command::Template(kind) => {
                self.session.switch_template(kind);
                self.preview = self.session.store().subscribe();
                format!(
                    "switched to {}; conversation cleared",
                    describe_template(kind)
                )
            }
            Command::Mode(mode) => {
                self.mode = mode;
                format!("mode: {mode}")
            }
            Command::Show => render_config(&self.session.config()),
            Command::Set { field, value } => {
                let mut delta = Map::new();
                delta.insert(field, value);
                render_delta(&self.session.edit(&delta))
            }
            Command::Reset => {
                self.session.reset();
                "record restored to defaults".to_string()
            }
            Command::History => self.render_history(),
            Command::Instruction(instruction) => {
                match self
                    .session
                    .submit(&self.bridge, &instruction, self.mode)
                    .await
                {
                    Ok(outcome) => render_outcome(&outcome),
                    Err(InstructionError::Empty) => String::new(),
                }
            }
        };

        (self.with_preview_notice(output), Step::Continue)
    }

    fn with_preview_notice(&mut self, output: String) -> String {
        if !self.preview.has_changed().unwrap_or(false) {
            return output;
        }
        let config = self.preview.borrow_and_update().clone();
        let (width, height) = config.kind().aspect_ratio().canvas_size();
        debug!(template = %config.kind(), "preview refreshed");
        let notice = format!("(preview updated: {} {width}x{height})", config.kind());
        if output.is_empty() {
            notice
        } else {
            format!("{output}\n{notice}")
        }
    }

    fn render_templates(&self) -> String {
        TemplateKind::ALL
            .iter()
            .map(|kind| {
                let marker = if *kind == self.session.kind() { "*" } else { " " };
                format!("{marker} {}", describe_template(*kind))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_history(&self) -> String {
        if self.session.history().is_empty() {
            return "(no conversation yet)".to_string();
        }
        self.session
            .history()
            .iter()
            .map(|turn| {
                let who = match (turn.role, turn.is_error) {
                    (_, true) => "error",
                    (TurnRole::User, false) => "you",
                    (TurnRole::Assistant, false) => "assistant",
                };
                format!("[{}] {who}: {}", turn.timestamp.format("%H:%M:%S"), turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Reads commands from stdin until `/quit` or end of input.
pub async fn run<T>(mut studio: Studio<T>) -> io::Result<()>
where
    T: RelayTransport,
{
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_block(&mut stdout, &studio.banner()).await?;
    loop {
        stdout
            .write_all(format!("{}> ", studio.mode()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(err) => {
                write_block(&mut stdout, &format!("error: {err}")).await?;
                continue;
            }
        };

        let (output, step) = studio.execute(command).await;
        write_block(&mut stdout, &output).await?;
        if step == Step::Quit {
            break;
        }
    }

    Ok(())
}

async fn write_block(stdout: &mut tokio::io::Stdout, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

fn describe_template(kind: TemplateKind) -> String {
    let aspect = kind.aspect_ratio();
    let (width, height) = aspect.canvas_size();
    format!(
        "{kind} ({}, {} {width}x{height})",
        kind.display_name(),
        aspect.label()
    )
}

fn render_config(config: &TemplateConfig) -> String {
    match config.html() {
        Some(html) => html.to_string(),
        None => format!("{:#}", Value::Object(config.fields())),
    }
}

fn render_delta(delta: &DeltaOutcome) -> String {
    let mut lines = Vec::new();
    if !delta.applied.is_empty() {
        lines.push(format!("  applied: {}", delta.applied.join(", ")));
    }
    for rejected in &delta.rejected {
        lines.push(format!("  skipped {}: {}", rejected.field, rejected.reason));
    }
    if lines.is_empty() {
        lines.push("  nothing changed".to_string());
    }
    lines.join("\n")
}

fn render_outcome(outcome: &InstructionOutcome) -> String {
    match outcome {
        InstructionOutcome::Applied {
            explanation,
            change: AppliedChange::Fields(delta),
        } => format!("assistant: {explanation}\n{}", render_delta(delta)),
        InstructionOutcome::Applied {
            explanation,
            change: AppliedChange::Html,
        } => format!("assistant: {explanation}\n  markup replaced"),
        InstructionOutcome::Replied { text } => format!("assistant: {text}"),
        InstructionOutcome::Failed { message } => format!("error: {message}"),
    }
}

const HELP_TEXT: &str = "\
/templates              list templates
/template <id>          switch template (clears the conversation)
/mode <design|code|chat>
/show                   print the current record
/set <field> <value>    edit one field directly
/reset                  restore template defaults
/history                show the conversation
/quit                   leave
anything else is sent to the assistant";

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use shared::assistant::{AssistantBridge, EditingSession};
    use shared::llm::{AssistantMode, RelayError, RelayFuture, RelayTransport};
    use shared::models::RelayRequest;
    use shared::templates::TemplateKind;

    use super::{Step, Studio};
    use crate::commands::Command;

    #[derive(Clone, Default)]
    struct Scripted {
        replies: Arc<Mutex<VecDeque<String>>>,
    }

    impl Scripted {
        fn with(replies: &[&str]) -> Self {
            Self {
                replies: Arc::new(Mutex::new(
                    replies.iter().map(ToString::to_string).collect(),
                )),
            }
        }
    }

    impl RelayTransport for Scripted {
        fn send<'a>(&'a self, _request: RelayRequest) -> RelayFuture<'a> {
            let next = self
                .replies
                .lock()
                .expect("script lock should not be poisoned")
                .pop_front();
            Box::pin(async move {
                next.ok_or_else(|| RelayError::Transport("script exhausted".to_string()))
            })
        }
    }

    fn studio(replies: &[&str]) -> Studio<Scripted> {
        Studio::new(
            EditingSession::new(TemplateKind::YoutubeThumbnail),
            AssistantBridge::new(Scripted::with(replies)),
            AssistantMode::Design,
        )
    }

    #[tokio::test]
    async fn instruction_applies_change_and_announces_preview() {
        let mut studio = studio(&["[설명] 빨간 배경이에요.\n[JSON] {\"bgColor\": \"#FF0000\"}"]);

        let (output, step) = studio
            .execute(Command::Instruction("배경 빨강".to_string()))
            .await;

        assert_eq!(step, Step::Continue);
        assert!(output.starts_with("assistant: 빨간 배경이에요."));
        assert!(output.contains("applied: bgColor"));
        assert!(output.contains("(preview updated: youtube-thumbnail 1280x720)"));
        assert_eq!(studio.session().config().fields()["bgColor"], json!("#FF0000"));
    }

    #[tokio::test]
    async fn relay_failure_is_printed_as_error() {
        let mut studio = studio(&[]);

        let (output, _) = studio
            .execute(Command::Instruction("hello".to_string()))
            .await;

        assert_eq!(output, "error: relay request failed: script exhausted");
        assert_eq!(studio.session().history().len(), 2);
    }

    #[tokio::test]
    async fn set_reports_skipped_fields_without_preview_when_nothing_changed() {
        let mut studio = studio(&[]);

        let (output, _) = studio
            .execute(Command::Set {
                field: "titleSize".to_string(),
                value: json!(9999),
            })
            .await;

        assert!(output.starts_with("  skipped titleSize:"));
        assert!(!output.contains("preview updated"));
    }

    #[tokio::test]
    async fn switching_template_resubscribes_and_mode_persists() {
        let mut studio = studio(&[]);

        studio.execute(Command::Mode(AssistantMode::Chat)).await;
        let (output, _) = studio
            .execute(Command::Template(TemplateKind::InstagramCard))
            .await;
        assert!(output.starts_with("switched to instagram-card"));
        assert!(output.contains("1:1 1080x1080"));
        assert_eq!(studio.mode(), AssistantMode::Chat);

        let (output, _) = studio
            .execute(Command::Set {
                field: "fontSize".to_string(),
                value: json!("48px"),
            })
            .await;
        assert!(output.contains("applied: fontSize"));
        assert!(output.contains("(preview updated: instagram-card 1080x1080)"));

        let (_, step) = studio.execute(Command::Quit).await;
        assert_eq!(step, Step::Quit);
    }
}
