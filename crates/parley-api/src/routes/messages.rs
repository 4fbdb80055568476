use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use parley_types::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct IngestReplyRequest {
    pub provider: String,
    pub content: String,
}

/// List a session's transcript, oldest first. Unknown sessions are empty.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ListMessagesResponse>> {
    let messages = state.router.list_messages(&session_id).await?;
    Ok(Json(ListMessagesResponse { messages }))
}

/// Store a reply computed by the client (e.g. an in-browser model)
pub async fn ingest_reply(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<IngestReplyRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(req) = payload?;
    let message = state
        .router
        .ingest_reply(&session_id, &req.provider, &req.content)
        .await?;
    Ok(Json(message))
}
