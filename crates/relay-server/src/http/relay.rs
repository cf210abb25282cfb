use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use shared::llm::UpstreamError;
use shared::models::RelayRequest;
use tracing::{error, info, warn};

use super::AppState;
use super::errors::{bad_request_response, error_response, internal_error_response};
use super::request_validation::validate_relay_request;

/// Forwards one prompt to the provider. Successful provider bodies are passed
/// through untouched; provider failures keep their status with a flat
/// `{error}` body.
pub(super) async fn relay_messages(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "relay body rejected");
            return bad_request_response(&rejection.body_text());
        }
    };

    if let Err(err) = validate_relay_request(&request, state.max_tokens_cap) {
        warn!(error = %err, "relay request failed validation");
        return bad_request_response(&err.to_string());
    }

    info!(
        messages = request.messages.len(),
        max_tokens = request.max_tokens,
        model = state.upstream.model(),
        "forwarding relay request"
    );

    match state.upstream.forward(&request).await {
        Ok(reply) if reply.is_success() => (reply.status, Json(reply.body)).into_response(),
        Ok(reply) => {
            let message = reply.error_message();
            warn!(status = reply.status.as_u16(), error = %message, "upstream rejected relay request");
            error_response(reply.status, &message)
        }
        Err(err @ UpstreamError::MissingCredential) => {
            error!("{err}");
            internal_error_response(&err.to_string())
        }
        Err(err) => {
            error!(error = %err, "upstream call failed");
            internal_error_response(&err.to_string())
        }
    }
}
