use std::time::{Duration, Instant};

use parley_llm::{ChatTurn, Credentials, ProviderRegistry, ProviderRequestError};
use parley_persist::{PersistError, TranscriptStore};
use parley_types::{Message, Provider, Role};

use crate::builder::CompletionRouterBuilder;
use crate::error::{CompletionError, Result};
use crate::locks::{SessionGuard, SessionLocks};

/// Stored in place of a reply when the provider succeeded without any text
pub const NO_RESPONSE_SENTINEL: &str = "No response received";

/// Turns a chat message into one provider request and stores the reply.
///
/// The transcript store stays the single source of truth for history: every
/// turn replays the whole session to the selected provider.
pub struct CompletionRouter {
    pub(crate) store: TranscriptStore,
    pub(crate) registry: ProviderRegistry,
    pub(crate) max_reply_tokens: u32,
    pub(crate) request_timeout: Duration,
    pub(crate) locks: Option<SessionLocks>,
}

impl CompletionRouter {
    pub fn builder() -> CompletionRouterBuilder {
        CompletionRouterBuilder::new()
    }

    /// Run one chat turn.
    ///
    /// The user message is committed before any network I/O and stays in the
    /// transcript even when the provider call fails. An assistant message is
    /// only appended after a successful call.
    pub async fn complete(
        &self,
        session_id: &str,
        provider: &str,
        message: &str,
        credentials: &Credentials,
    ) -> Result<Message> {
        let provider: Provider = provider.parse()?;
        let adapter = match self.registry.get(provider) {
            Some(adapter) => adapter,
            None if provider.is_client_side() => {
                return Err(CompletionError::UnsupportedProvider(format!(
                    "{} (replies are computed by the client and posted to the session)",
                    provider
                )));
            }
            None => return Err(CompletionError::UnsupportedProvider(provider.to_string())),
        };

        if adapter.requires_api_key() && !credentials.has_api_key() && !adapter.has_default_api_key() {
            return Err(CompletionError::Validation(format!(
                "an API key is required for provider {}",
                provider
            )));
        }

        let _guard = self.lock_session(session_id).await;

        self.store.append(session_id, Role::User, message, None).await?;

        let history: Vec<ChatTurn> = self
            .store
            .read(session_id)
            .await?
            .iter()
            .map(ChatTurn::from)
            .collect();

        let started = Instant::now();
        let call = adapter.send(&history, credentials, self.max_reply_tokens);
        let reply = match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => return Err(self.provider_failed(session_id, err)),
            Err(_) => {
                let err = ProviderRequestError::timeout(provider, self.request_timeout);
                return Err(self.provider_failed(session_id, err));
            }
        };

        let content = match reply.content {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                tracing::warn!(
                    session_id = %session_id,
                    provider = %provider,
                    "Provider reply had no text content"
                );
                NO_RESPONSE_SENTINEL.to_string()
            }
        };

        // Without session locks a clear can land while the provider call is
        // in flight; the store then refuses the reply.
        let stored = self
            .store
            .append(session_id, Role::Assistant, &content, Some(provider))
            .await
            .map_err(|err| match err {
                PersistError::NoUserMessage(_) => {
                    tracing::warn!(
                        session_id = %session_id,
                        provider = %provider,
                        "Session cleared before the reply arrived; reply discarded"
                    );
                    CompletionError::SessionCleared(session_id.to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(
            session_id = %session_id,
            provider = %provider,
            model = reply.model.as_deref().unwrap_or("unknown"),
            turns = history.len(),
            output_tokens = reply.usage.as_ref().map(|u| u.output_tokens).unwrap_or(0),
            duration_ms = %started.elapsed().as_millis(),
            "Completion stored"
        );

        Ok(stored)
    }

    /// Store a reply produced outside the router, e.g. by a client-side model.
    ///
    /// The session must already hold a user message; the content is stored
    /// as given and is never replaced by the sentinel.
    pub async fn ingest_reply(&self, session_id: &str, provider: &str, content: &str) -> Result<Message> {
        let provider: Provider = provider.parse()?;
        if content.trim().is_empty() {
            return Err(CompletionError::Validation("reply content must not be empty".to_string()));
        }

        let _guard = self.lock_session(session_id).await;

        let stored = self
            .store
            .append(session_id, Role::Assistant, content, Some(provider))
            .await?;

        tracing::info!(
            session_id = %session_id,
            provider = %provider,
            "External reply stored"
        );

        Ok(stored)
    }

    /// Transcript of a session, oldest first
    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        Ok(self.store.read(session_id).await?)
    }

    /// Delete a session's transcript. Clearing an unknown session succeeds.
    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        let _guard = self.lock_session(session_id).await;
        self.store.clear(session_id).await?;

        tracing::info!(session_id = %session_id, "Session cleared");
        Ok(())
    }

    /// Providers this router can dispatch to
    pub fn providers(&self) -> Vec<Provider> {
        self.registry.providers()
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn max_reply_tokens(&self) -> u32 {
        self.max_reply_tokens
    }

    async fn lock_session(&self, session_id: &str) -> Option<SessionGuard<'_>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(session_id).await),
            None => None,
        }
    }

    fn provider_failed(&self, session_id: &str, err: ProviderRequestError) -> CompletionError {
        tracing::warn!(
            session_id = %session_id,
            provider = %err.provider,
            kind = %err.kind,
            status = ?err.status,
            error = %err.message,
            "Provider request failed"
        );
        CompletionError::ProviderRequest(err)
    }
}
