use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::llm::AnthropicUpstream;

mod errors;
mod health;
mod observability;
mod relay;
mod request_validation;

pub const RELAY_PATH: &str = "/api/claude";

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<AnthropicUpstream>,
    pub max_tokens_cap: u32,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route(RELAY_PATH, post(relay::relay_messages))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use shared::config::UpstreamConfig;
    use shared::llm::AnthropicUpstream;
    use tower::ServiceExt;

    use super::{AppState, RELAY_PATH, build_router};

    fn test_router(api_key: Option<&str>) -> axum::Router {
        // Nothing listens here; tests below never reach the upstream.
        let upstream = AnthropicUpstream::new(UpstreamConfig::new(
            api_key.map(ToString::to_string),
            "http://127.0.0.1:9/v1/messages",
        ))
        .expect("upstream should build");
        build_router(AppState {
            upstream: Arc::new(upstream),
            max_tokens_cap: 4096,
        })
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = app.oneshot(request).await.expect("router should respond");
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body, request_id)
    }

    fn relay_post(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(RELAY_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request should build")
    }

    fn valid_body() -> Value {
        json!({
            "max_tokens": 2000,
            "temperature": 0.7,
            "system": "sys",
            "messages": [{"role": "user", "content": "배경을 빨간색으로"}]
        })
    }

    #[tokio::test]
    async fn healthz_reports_ok_with_request_id() {
        let request = Request::builder()
            .uri("/healthz")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .expect("request should build");

        let (status, body, request_id) = send(test_router(None), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
        assert_eq!(request_id.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn missing_credential_is_a_server_error() {
        let (status, body, request_id) =
            send(test_router(None), relay_post(valid_body().to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ANTHROPIC_API_KEY is not configured");
        assert!(request_id.is_some());
    }

    #[tokio::test]
    async fn unparseable_body_is_rejected_before_forwarding() {
        let (status, body, _) =
            send(test_router(Some("key")), relay_post("{not json".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|message| !message.is_empty()));
    }

    #[tokio::test]
    async fn out_of_range_fields_are_rejected() {
        let mut body = valid_body();
        body["max_tokens"] = json!(100_000);

        let (status, response, _) =
            send(test_router(Some("key")), relay_post(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "max_tokens must be between 1 and 4096");
    }

    #[tokio::test]
    async fn conversation_must_end_with_user_turn() {
        let mut body = valid_body();
        body["messages"] = json!([
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ]);

        let (status, response, _) =
            send(test_router(Some("key")), relay_post(body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "the last message must come from the user");
    }
}
