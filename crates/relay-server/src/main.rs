use std::net::SocketAddr;
use std::sync::Arc;

use relay_server::http::{AppState, build_router};
use shared::config::{RelayConfig, load_dotenv};
use shared::llm::AnthropicUpstream;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "relay_server=info,shared=info,axum=info".to_string()),
        )
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .init();

    let config = match RelayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let upstream = match AnthropicUpstream::new(config.upstream) {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("failed to build upstream client: {err}");
            std::process::exit(1);
        }
    };
    if !upstream.has_credential() {
        warn!("ANTHROPIC_API_KEY is not set; relay calls will fail until it is configured");
    }
    info!(model = upstream.model(), "upstream configured");

    let app = build_router(AppState {
        upstream: Arc::new(upstream),
        max_tokens_cap: config.max_tokens_cap,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("invalid RELAY_BIND_ADDR {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "relay server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server stopped with error: {err}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
