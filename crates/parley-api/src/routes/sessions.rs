use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

/// Delete every message of a session
pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.router.clear_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
