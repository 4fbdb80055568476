use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use parley_llm::Credentials;
use parley_types::Message;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequest {
    pub message: String,
    pub provider: String,
    pub session_id: String,
    /// Optional for providers that need no credential
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Run one chat turn and return the stored assistant message
pub async fn send_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendChatRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(req) = payload?;
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("sessionId must not be empty".to_string()));
    }

    let credentials = Credentials::from_option(req.api_key);
    let message = state
        .router
        .complete(&req.session_id, &req.provider, &req.message, &credentials)
        .await?;

    Ok(Json(message))
}
