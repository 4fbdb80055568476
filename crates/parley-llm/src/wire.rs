// OpenAI chat-completions wire format, shared by every adapter

use parley_types::{Provider, Role};
use serde_json::{json, Value};

use crate::error::{ProviderErrorKind, ProviderRequestError};
use crate::traits::{ChatTurn, ProviderReply, TokenUsage};

/// JSON pointer to the reply text in a chat-completions response
pub const CHAT_CONTENT_POINTER: &str = "/choices/0/message/content";

/// Default role vocabulary of chat-completions providers
pub fn chat_role(role: Role) -> Option<&'static str> {
    match role {
        Role::User => Some("user"),
        Role::Assistant => Some("assistant"),
    }
}

/// Build `{model, messages, max_tokens}`.
///
/// Turns whose role has no mapping are left out of the payload.
pub fn build_chat_body(
    model: &str,
    history: &[ChatTurn],
    max_tokens: u32,
    map_role: impl Fn(Role) -> Option<&'static str>,
) -> Value {
    let messages: Vec<Value> = history
        .iter()
        .filter_map(|turn| match map_role(turn.role) {
            Some(role) => Some(json!({ "role": role, "content": turn.content })),
            None => {
                tracing::debug!(role = %turn.role, "Dropping turn with unmapped role");
                None
            }
        })
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": max_tokens,
    })
}

/// Turn an HTTP response into a reply or a typed failure
pub async fn read_reply(
    provider: Provider,
    response: reqwest::Response,
    content_pointer: &str,
) -> Result<ProviderReply, ProviderRequestError> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let kind = if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            ProviderErrorKind::Unauthorized
        } else {
            ProviderErrorKind::Status
        };
        return Err(
            ProviderRequestError::new(provider, kind, upstream_message(&error_text, status))
                .with_status(status.as_u16()),
        );
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderRequestError::from_reqwest(provider, e))?;

    let raw: Value = serde_json::from_str(&body).map_err(|e| {
        ProviderRequestError::new(
            provider,
            ProviderErrorKind::MalformedBody,
            format!("response is not valid JSON: {}", e),
        )
        .with_status(status.as_u16())
    })?;

    Ok(parse_reply(&raw, content_pointer))
}

/// Extract reply text, model and usage from a parsed response body
pub fn parse_reply(raw: &Value, content_pointer: &str) -> ProviderReply {
    let content = raw
        .pointer(content_pointer)
        .and_then(Value::as_str)
        .map(str::to_string);

    let usage = raw.get("usage").map(|usage| {
        let field = |name: &str| {
            let count = usage.get(name).and_then(Value::as_u64).unwrap_or(0);
            u32::try_from(count).unwrap_or(u32::MAX)
        };
        TokenUsage {
            input_tokens: field("prompt_tokens"),
            output_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    });

    ProviderReply {
        content,
        model: raw.get("model").and_then(Value::as_str).map(str::to_string),
        usage,
    }
}

/// Prefer the provider's own `error.message`, fall back to the raw body
fn upstream_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message").or_else(|| v.get("error")))
        .and_then(Value::as_str);

    match message {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => status.to_string(),
        None => body.to_string(),
    }
}
