use std::sync::Arc;

use chrono::Utc;
use parley_types::{Message, Provider, Role};

use crate::backend::TranscriptBackend;
use crate::error::{PersistError, Result};
use crate::memory::MemoryBackend;

/// Ordered message history keyed by session id.
///
/// The store is the only place messages are created: it assigns ids and
/// timestamps and rejects blank content. Construct it once and share it
/// through an `Arc`.
#[derive(Clone)]
pub struct TranscriptStore {
    backend: Arc<dyn TranscriptBackend>,
}

impl TranscriptStore {
    pub fn new(backend: Arc<dyn TranscriptBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh [`MemoryBackend`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Create and store a new message.
    ///
    /// Content is kept verbatim; it only has to contain something other than
    /// whitespace. Timestamps never go backwards within a session, even if the
    /// wall clock does or appends race. An assistant message needs a user
    /// message earlier in the same session.
    pub async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        provider: Option<Provider>,
    ) -> Result<Message> {
        if session_id.trim().is_empty() {
            return Err(PersistError::Validation("session id must not be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(PersistError::Validation("message content must not be empty".to_string()));
        }

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            provider,
            timestamp: Utc::now(),
        };

        let message = self.backend.push(message).await?;

        tracing::debug!(
            session_id = %session_id,
            message_id = %message.id,
            role = %role,
            "Message appended"
        );

        Ok(message)
    }

    /// All messages of a session in creation order
    pub async fn read(&self, session_id: &str) -> Result<Vec<Message>> {
        self.backend.load(session_id).await
    }

    /// Remove every message of a session. Idempotent.
    pub async fn clear(&self, session_id: &str) -> Result<()> {
        self.backend.remove(session_id).await?;
        tracing::debug!(session_id = %session_id, "Session cleared");
        Ok(())
    }

    pub async fn session_count(&self) -> Result<usize> {
        self.backend.session_count().await
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
