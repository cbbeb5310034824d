use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::{
    chat::{fallback_payload, ChatError},
    client::ClientAddr,
    error::AppError,
    state::AppState,
};

/// `POST /api/chat-assistant`: forward a visitor prompt to the model.
///
/// ## Request
/// `{ "prompt": "<string>" }`; the prompt is sent upstream verbatim.
///
/// ## Rate limiting
/// One accepted request per client address every 2 s. The check runs before
/// the body is validated, so malformed requests still consume the slot.
///
/// ## Response
/// - `200` with the upstream JSON on success.
/// - `200` with a single fallback candidate when the upstream fails or no API
///   key is configured. The terminal renders it like any other answer.
/// - `400` when `prompt` is missing or not a string.
/// - `429` when rate limited.
#[tracing::instrument(skip_all, fields(client = %client.as_str()))]
pub async fn chat_assistant(
    State(state): State<Arc<AppState>>,
    client: ClientAddr,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    if state.rate_limiter.is_rate_limited(client.as_str()) {
        return Err(AppError::RateLimited);
    }

    let prompt = payload
        .ok()
        .and_then(|Json(body)| match body.get("prompt") {
            Some(Value::String(p)) if !p.is_empty() => Some(p.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            AppError::BadRequest("Invalid request format - prompt required".to_string())
        })?;

    let result = match &state.chat {
        Some(chat) => chat.generate(&prompt).await,
        None => Err(ChatError::NotConfigured),
    };

    match result {
        Ok(body) => Ok(Json(body)),
        Err(ChatError::NotConfigured) => {
            tracing::debug!("Chat not configured, sending fallback");
            Ok(Json(fallback_payload(ChatError::NotConfigured.fallback_message())))
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat upstream failed, sending fallback");
            Ok(Json(fallback_payload(e.fallback_message())))
        }
    }
}
