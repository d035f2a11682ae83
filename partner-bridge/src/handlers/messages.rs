use crate::models::InboundMessage;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// Forwarded platform message event from the host shell.
///
/// Accepted as soon as it is queued: untrusted or malformed partner messages
/// are dropped by the router and are deliberately not reported back.
pub async fn receive_message(
    State(state): State<AppState>,
    Json(message): Json<InboundMessage>,
) -> StatusCode {
    match state.listener.deliver(message).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Failed to queue message: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
