//! `/api/chat`

use crate::error::AppError;
use crate::http_server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let message = body
        .ok()
        .and_then(|Json(req)| req.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::bad_request("No message provided"))?;

    let client = state
        .chat
        .as_ref()
        .ok_or(AppError::Unavailable("Chat service not available"))?;

    debug!(provider = client.provider_name(), len = message.len(), "Relaying chat message");

    let reply = client.complete_text(message).await.map_err(|e| {
        error!(error = %e, "Chat provider call failed");
        AppError::Upstream("Chat provider error")
    })?;

    Ok(Json(ChatReply { reply }))
}
