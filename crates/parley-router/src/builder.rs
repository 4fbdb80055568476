use anyhow::{anyhow, Result};
use parley_llm::ProviderRegistry;
use parley_persist::TranscriptStore;
use std::time::Duration;

use crate::config::RouterConfig;
use crate::locks::SessionLocks;
use crate::router::CompletionRouter;

/// Builder for constructing a CompletionRouter
pub struct CompletionRouterBuilder {
    store: Option<TranscriptStore>,
    registry: ProviderRegistry,
    max_reply_tokens: u32,
    request_timeout: Duration,
    serialize_sessions: bool,
}

impl CompletionRouterBuilder {
    pub fn new() -> Self {
        let config = RouterConfig::default();
        Self {
            store: None,
            registry: ProviderRegistry::new(),
            max_reply_tokens: config.max_reply_tokens,
            request_timeout: config.request_timeout(),
            serialize_sessions: config.serialize_sessions,
        }
    }

    /// Set the transcript store (defaults to an in-memory one)
    pub fn store(mut self, store: TranscriptStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: &RouterConfig) -> Self {
        self.max_reply_tokens = config.max_reply_tokens;
        self.request_timeout = config.request_timeout();
        self.serialize_sessions = config.serialize_sessions;
        self
    }

    pub fn max_reply_tokens(mut self, tokens: u32) -> Self {
        self.max_reply_tokens = tokens;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn serialize_sessions(mut self, enabled: bool) -> Self {
        self.serialize_sessions = enabled;
        self
    }

    /// Build the router
    pub fn build(self) -> Result<CompletionRouter> {
        if self.max_reply_tokens == 0 {
            return Err(anyhow!("max_reply_tokens must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow!("request timeout must be greater than zero"));
        }
        if self.registry.is_empty() {
            tracing::warn!("Completion router built without any provider adapters");
        }

        Ok(CompletionRouter {
            store: self.store.unwrap_or_default(),
            registry: self.registry,
            max_reply_tokens: self.max_reply_tokens,
            request_timeout: self.request_timeout,
            locks: self.serialize_sessions.then(SessionLocks::new),
        })
    }
}

impl Default for CompletionRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
