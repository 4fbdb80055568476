use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_llm::ProviderErrorKind;
use parley_router::CompletionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "kind": "validation" }),
            ),
            ApiError::Completion(CompletionError::Validation(_)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "kind": "validation" }),
            ),
            ApiError::Completion(CompletionError::UnsupportedProvider(_)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "kind": "unsupported_provider" }),
            ),
            ApiError::Completion(CompletionError::SessionCleared(_)) => (
                StatusCode::CONFLICT,
                json!({ "error": self.to_string(), "kind": "session_cleared" }),
            ),
            ApiError::Completion(CompletionError::ProviderRequest(err)) => {
                tracing::warn!(provider = %err.provider, kind = %err.kind, "Provider error returned to client");
                let status = if err.kind == ProviderErrorKind::Timeout {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (
                    status,
                    json!({
                        "error": err.to_string(),
                        "kind": "provider_request",
                        "provider": err.provider,
                        "reason": err.kind,
                        "status": err.status,
                    }),
                )
            }
            ApiError::Completion(CompletionError::Storage(msg)) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Storage error", "kind": "storage" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
