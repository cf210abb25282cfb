mod cli;
mod commands;
mod repl;

use std::time::Duration;

use shared::assistant::{AssistantBridge, EditingSession};
use shared::config::{StudioConfig, load_dotenv};
use shared::llm::HttpRelayClient;
use tracing::info;

use cli::{CliError, CliOptions};
use repl::Studio;

#[tokio::main]
async fn main() {
    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studio_cli=warn,shared=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match StudioConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to read studio config: {err}");
            std::process::exit(1);
        }
    };
    let relay_url = options.relay_url.unwrap_or(config.relay_url);

    let client = match config.relay_timeout_ms {
        Some(timeout_ms) => {
            HttpRelayClient::with_timeout(relay_url, Duration::from_millis(timeout_ms))
        }
        None => HttpRelayClient::new(relay_url),
    };
    let client = match client {
        Ok(client) => client,
        Err(err) => {
            eprintln!("failed to build relay client: {err}");
            std::process::exit(1);
        }
    };
    info!(relay_url = client.relay_url(), "studio starting");

    let session =
        EditingSession::with_limits(options.template, config.history_limit, config.recent_turns);
    let studio = Studio::new(session, AssistantBridge::new(client), options.mode);

    if let Err(err) = repl::run(studio).await {
        eprintln!("terminal i/o failed: {err}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "Usage: cargo run -p studio-cli -- [--relay-url URL] [--template ID] [--mode design|code|chat]\n\
         \n\
         Templates: youtube-thumbnail, instagram-card, product-detail, comic-panel,\n\
         landing-hero, design-promo\n\
         \n\
         Options:\n\
         - --relay-url  Relay endpoint (default: STUDIO_RELAY_URL or http://127.0.0.1:8787/api/claude)\n\
         - --template   Template to open (default: youtube-thumbnail)\n\
         - --mode       Assistant mode (default: design)\n\
         - --help       Show this help text"
    );
}
