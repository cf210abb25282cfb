#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use relay_server::http::{AppState, build_router};
use serde_json::{Value, json};
use shared::config::UpstreamConfig;
use shared::llm::AnthropicUpstream;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

pub const TEST_API_KEY: &str = "sk-ant-integration";

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: Value,
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "id": "msg_integration",
                "type": "message",
                "role": "assistant",
                "model": "claude-test",
                "content": [{"type": "text", "text": text}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 34}
            }),
        }
    }

    pub fn provider_error(status: StatusCode, error_type: &str, message: &str) -> Self {
        Self {
            status,
            body: json!({
                "type": "error",
                "error": {"type": error_type, "message": message}
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub api_key: Option<String>,
    pub version: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct MockUpstream {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockUpstream {
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().await.clone()
    }
}

/// A running HTTP server plus the handle needed to stop it.
pub struct RunningServer {
    pub url: String,
    shutdown_tx: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl RunningServer {
    pub async fn stop(self) {
        self.shutdown_tx
            .send(())
            .expect("shutdown signal should send");
        self.task.await.expect("server task should join");
    }
}

pub async fn spawn_mock_upstream(upstream: MockUpstream) -> RunningServer {
    let app = Router::new()
        .route("/v1/messages", post(mock_messages_handler))
        .with_state(upstream);
    let server = spawn_router(app).await;
    RunningServer {
        url: format!("{}/v1/messages", server.url),
        ..server
    }
}

pub fn relay_router(upstream_url: &str, api_key: Option<&str>) -> Router {
    let upstream = AnthropicUpstream::new(UpstreamConfig::new(
        api_key.map(ToString::to_string),
        upstream_url,
    ))
    .expect("upstream client should build");

    build_router(AppState {
        upstream: Arc::new(upstream),
        max_tokens_cap: 4096,
    })
}

pub async fn spawn_relay(upstream_url: &str, api_key: Option<&str>) -> RunningServer {
    let server = spawn_router(relay_router(upstream_url, api_key)).await;
    RunningServer {
        url: format!("{}/api/claude", server.url),
        ..server
    }
}

async fn spawn_router(app: Router) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let local_addr = listener
        .local_addr()
        .expect("listener address should resolve");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        server.await.expect("test server should run");
    });

    RunningServer {
        url: format!("http://{local_addr}"),
        shutdown_tx,
        task,
    }
}

async fn mock_messages_handler(
    State(state): State<MockUpstream>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    };
    state.seen.lock().await.push(SeenRequest {
        api_key: header("x-api-key"),
        version: header("anthropic-version"),
        body: payload,
    });

    let reply = state
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| {
            MockReply::provider_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "api_error",
                "no scripted reply",
            )
        });

    (reply.status, Json(reply.body))
}
