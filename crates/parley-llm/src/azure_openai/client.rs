// Azure OpenAI-specific client implementation

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use parley_types::Provider;
use std::time::Duration;

use crate::error::{ProviderErrorKind, ProviderRequestError};
use crate::traits::{ChatTurn, Credentials, ProviderAdapter, ProviderReply};
use crate::wire::{build_chat_body, chat_role, read_reply, CHAT_CONTENT_POINTER};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Azure OpenAI client (HTTP direct, no SDK)
///
/// Azure OpenAI uses a different endpoint structure and authentication method than OpenAI:
/// - URL: https://{resource}.openai.azure.com/openai/deployments/{deployment}/chat/completions?api-version=...
/// - Auth header: api-key instead of Authorization: Bearer
/// - The deployment selects the model; it is also sent as `model` in the body
#[derive(Debug)]
pub struct AzureOpenAIClient {
    http_client: reqwest::Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    default_api_key: Option<String>,
}

impl AzureOpenAIClient {
    /// Create new Azure OpenAI client with builder pattern
    pub fn builder() -> AzureOpenAIClientBuilder {
        AzureOpenAIClientBuilder::default()
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl ProviderAdapter for AzureOpenAIClient {
    fn provider(&self) -> Provider {
        Provider::AzureOpenAI
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
        let api_key = credentials
            .key()
            .or(self.default_api_key.as_deref())
            .ok_or_else(|| {
                ProviderRequestError::new(
                    Provider::AzureOpenAI,
                    ProviderErrorKind::MissingCredentials,
                    "no API key provided",
                )
            })?;

        let payload = build_chat_body(&self.deployment, history, max_reply_tokens, chat_role);

        tracing::debug!(
            deployment = %self.deployment,
            turns = history.len(),
            "Sending Azure chat completion"
        );

        let response = self
            .http_client
            .post(self.completions_url())
            .header("api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderRequestError::from_reqwest(Provider::AzureOpenAI, e))?;

        read_reply(Provider::AzureOpenAI, response, CHAT_CONTENT_POINTER).await
    }
}

/// Builder for AzureOpenAIClient
#[derive(Default)]
pub struct AzureOpenAIClientBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    deployment: Option<String>,
    api_version: Option<String>,
}

impl AzureOpenAIClientBuilder {
    /// Fallback API key, used when a request carries none
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Resource endpoint, e.g. "https://my-resource.openai.azure.com"
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    /// API version, e.g. "2024-02-15-preview"
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn build(self) -> Result<AzureOpenAIClient> {
        let endpoint = self.endpoint.ok_or_else(|| anyhow!("Endpoint is required"))?;
        let deployment = self.deployment.ok_or_else(|| anyhow!("Deployment is required"))?;
        let api_version = self.api_version.ok_or_else(|| anyhow!("API version is required"))?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(AzureOpenAIClient {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment,
            api_version,
            default_api_key: self.api_key,
        })
    }
}
