// Configuration layer for building provider adapters
// Mirrors the `[providers.*]` tables of the service configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::azure_openai::AzureOpenAIClient;
use crate::openai::OpenAIClient;
use crate::registry::ProviderRegistry;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

fn default_enabled() -> bool {
    true
}

/// Settings for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Overrides the provider's public endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Fallback key (from ENV, never from TOML in practice)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: None,
            base_url: None,
            api_key: None,
        }
    }
}

/// Settings for Azure OpenAI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

/// Every configurable provider; an absent table leaves that provider unregistered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub openai: Option<OpenAIConfig>,
    #[serde(default)]
    pub azure_openai: Option<AzureConfig>,
    #[serde(default)]
    pub groq: Option<OpenAIConfig>,
    #[serde(default)]
    pub ollama: Option<OpenAIConfig>,
}

impl ProviderSettings {
    /// Create a registry holding one adapter per enabled provider
    pub fn build_registry(&self) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();

        if let Some(cfg) = self.openai.as_ref().filter(|c| c.enabled) {
            let client = OpenAIClient::openai(model_or(cfg, DEFAULT_OPENAI_MODEL))?;
            registry.register(Arc::new(apply_common(client, cfg)));
        }
        if let Some(cfg) = self.groq.as_ref().filter(|c| c.enabled) {
            let client = OpenAIClient::groq(model_or(cfg, DEFAULT_GROQ_MODEL))?;
            registry.register(Arc::new(apply_common(client, cfg)));
        }
        if let Some(cfg) = self.ollama.as_ref().filter(|c| c.enabled) {
            let client = OpenAIClient::ollama(model_or(cfg, DEFAULT_OLLAMA_MODEL))?;
            registry.register(Arc::new(apply_common(client, cfg)));
        }
        if let Some(cfg) = self.azure_openai.as_ref().filter(|c| c.enabled) {
            let mut builder = AzureOpenAIClient::builder()
                .endpoint(cfg.endpoint.clone())
                .deployment(cfg.deployment.clone())
                .api_version(cfg.api_version.clone());
            if let Some(key) = &cfg.api_key {
                builder = builder.api_key(key.clone());
            }
            registry.register(Arc::new(builder.build()?));
        }

        tracing::info!(providers = ?registry.providers(), "Provider registry built");
        Ok(registry)
    }
}

fn model_or(cfg: &OpenAIConfig, default: &str) -> String {
    cfg.model.clone().unwrap_or_else(|| default.to_string())
}

fn apply_common(mut client: OpenAIClient, cfg: &OpenAIConfig) -> OpenAIClient {
    if let Some(base_url) = &cfg.base_url {
        client = client.with_base_url(base_url.clone());
    }
    if let Some(key) = &cfg.api_key {
        client = client.with_api_key(key.clone());
    }
    client
}
