use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Acknowledges every event that was handled or deliberately ignored.
pub async fn intercom_webhook(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookAck>, ApiError> {
    let outcome = state.gateway.handle_inbound_event(&payload).await?;
    tracing::debug!(?outcome, "webhook handled");

    Ok(Json(WebhookAck { status: "success" }))
}
