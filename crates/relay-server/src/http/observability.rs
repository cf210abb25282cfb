use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Tags every request with a correlation id, runs it inside a span carrying
/// that id, and echoes the id back in the response headers.
pub(super) async fn request_observability_middleware(req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or(path);
    let span = info_span!(
        "relay_http_request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );
    let started_at = Instant::now();

    let mut response = next.run(req).instrument(span.clone()).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            header_value,
        );
    }

    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    span.in_scope(|| {
        if status >= 500 {
            warn!(status, latency_ms, "relay request completed with server error");
        } else {
            info!(status, latency_ms, "relay request completed");
        }
    });

    response
}

fn resolve_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn normalize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LEN {
        return None;
    }

    let valid = trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));
    valid.then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_request_id;

    #[test]
    fn keeps_caller_supplied_ids_that_are_safe_to_echo() {
        assert_eq!(
            normalize_request_id(" studio-7f3a.1 "),
            Some("studio-7f3a.1".to_string())
        );
    }

    #[test]
    fn replaces_unsafe_or_oversized_ids() {
        assert!(normalize_request_id("   ").is_none());
        assert!(normalize_request_id("id with spaces").is_none());
        assert!(normalize_request_id(&"a".repeat(129)).is_none());
    }
}
