use async_trait::async_trait;
use parley_types::{Message, Provider, Role};
use serde::{Deserialize, Serialize};

use crate::error::ProviderRequestError;

/// The single capability every completion provider offers
///
/// Implementations differ only in endpoint, auth header and where the reply
/// text lives in the response body. The router never looks past this trait.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to
    fn provider(&self) -> Provider;

    /// Whether a request without an API key can succeed at all
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Whether the adapter was configured with a fallback key
    fn has_default_api_key(&self) -> bool {
        false
    }

    /// Synchronous request/response completion over the full history
    async fn send(
        &self,
        history: &[ChatTurn],
        credentials: &Credentials,
        max_reply_tokens: u32,
    ) -> Result<ProviderReply, ProviderRequestError>;
}

/// One transcript entry as replayed to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}

/// Per-request credentials supplied by the caller
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank keys are treated as absent
    pub fn api_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            api_key: (!key.trim().is_empty()).then_some(key),
        }
    }

    pub fn from_option(key: Option<String>) -> Self {
        key.map(Self::api_key).unwrap_or_default()
    }

    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Provider-agnostic reply
#[derive(Debug, Clone, Default)]
pub struct ProviderReply {
    /// `None` when the response had no textual content at the expected path
    pub content: Option<String>,
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}
