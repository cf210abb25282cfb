use shared::llm::AssistantMode;
use shared::templates::TemplateKind;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Overrides `STUDIO_RELAY_URL` when set.
    pub relay_url: Option<String>,
    pub template: TemplateKind,
    pub mode: AssistantMode,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for argument: {0}")]
    MissingValue(String),
    #[error("invalid --template value: {0}")]
    InvalidTemplate(String),
    #[error("invalid --mode value: {0}")]
    InvalidMode(String),
    #[error("help requested")]
    HelpRequested,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut relay_url = None;
        let mut template = TemplateKind::YoutubeThumbnail;
        let mut mode = AssistantMode::Design;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliError::HelpRequested),
                "--relay-url" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    relay_url = Some(value.trim().to_string());
                }
                "--template" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    template = value
                        .parse()
                        .map_err(|_| CliError::InvalidTemplate(value.clone()))?;
                }
                "--mode" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    mode = value
                        .parse()
                        .map_err(|_| CliError::InvalidMode(value.clone()))?;
                }
                unknown => return Err(CliError::UnknownArgument(unknown.to_string())),
            }
        }

        Ok(Self {
            relay_url,
            template,
            mode,
        })
    }
}
