// OpenAI-compatible client (OpenAI, Groq, Ollama)

use anyhow::{Context, Result};
use async_trait::async_trait;
use parley_types::Provider;
use std::time::Duration;

use crate::error::{ProviderErrorKind, ProviderRequestError};
use crate::traits::{ChatTurn, Credentials, ProviderAdapter, ProviderReply};
use crate::wire::{build_chat_body, chat_role, read_reply, CHAT_CONTENT_POINTER};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the API key travels with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `api-key: <key>`
    ApiKeyHeader,
    /// No credential at all (local servers)
    None,
}

/// Client for any chat-completions endpoint (HTTP direct, no SDK)
///
/// One instance serves one provider. The key comes from the request
/// credentials, falling back to the key configured on the client.
#[derive(Debug)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    provider: Provider,
    base_url: String,
    model: String,
    auth: AuthScheme,
    default_api_key: Option<String>,
    content_pointer: String,
}

impl OpenAIClient {
    /// Create a client for `provider` against `base_url`
    pub fn new(
        provider: Provider,
        base_url: impl Into<String>,
        model: impl Into<String>,
        auth: AuthScheme,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            provider,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            auth,
            default_api_key: None,
            content_pointer: CHAT_CONTENT_POINTER.to_string(),
        })
    }

    pub fn openai(model: impl Into<String>) -> Result<Self> {
        Self::new(Provider::OpenAI, OPENAI_API_BASE, model, AuthScheme::Bearer)
    }

    pub fn groq(model: impl Into<String>) -> Result<Self> {
        Self::new(Provider::Groq, GROQ_API_BASE, model, AuthScheme::Bearer)
    }

    pub fn ollama(model: impl Into<String>) -> Result<Self> {
        Self::new(Provider::Ollama, OLLAMA_API_BASE, model, AuthScheme::None)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Key used when a request carries none
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.default_api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn with_content_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.content_pointer = pointer.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn resolve_key<'a>(&'a self, credentials: &'a Credentials) -> Option<&'a str> {
        credentials.key().or(self.default_api_key.as_deref())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn requires_api_key(&self) -> bool {
        self.auth != AuthScheme::None
    }

    fn has_default_api_key(&self) -> bool {
        self.default_api_key.is_some()
    }

    async fn send(
        &self,
        history: &[ChatTurn],
        credentials: &Credentials,
        max_reply_tokens: u32,
    ) -> Result<ProviderReply, ProviderRequestError> {
        let payload = build_chat_body(&self.model, history, max_reply_tokens, chat_role);

        let mut request = self.http_client.post(self.completions_url()).json(&payload);

        match (self.auth, self.resolve_key(credentials)) {
            (AuthScheme::None, _) => {}
            (AuthScheme::Bearer, Some(key)) => request = request.bearer_auth(key),
            (AuthScheme::ApiKeyHeader, Some(key)) => request = request.header("api-key", key),
            (_, None) => {
                return Err(ProviderRequestError::new(
                    self.provider,
                    ProviderErrorKind::MissingCredentials,
                    "no API key provided",
                ));
            }
        }

        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            turns = history.len(),
            "Sending chat completion"
        );

        let response = request
            .send()
            .await
            .map_err(|e| ProviderRequestError::from_reqwest(self.provider, e))?;

        read_reply(self.provider, response, &self.content_pointer).await
    }
}
