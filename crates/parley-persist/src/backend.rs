use async_trait::async_trait;
use parley_types::Message;

use crate::error::Result;

/// Storage operations behind a [`TranscriptStore`](crate::TranscriptStore)
///
/// Implementations own the message collection. They never create messages;
/// they keep them in the order they were pushed.
#[async_trait]
pub trait TranscriptBackend: Send + Sync {
    /// Append a message to the end of its session and return it as stored.
    ///
    /// Must be atomic per session: the timestamp is raised to the previous
    /// message's if it is older, and an assistant message is refused with
    /// [`PersistError::NoUserMessage`](crate::PersistError::NoUserMessage)
    /// unless the session already holds a user message.
    async fn push(&self, message: Message) -> Result<Message>;

    /// All messages for a session, in push order. Unknown sessions are empty.
    async fn load(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Drop every message of a session. Removing an unknown session is a no-op.
    async fn remove(&self, session_id: &str) -> Result<()>;

    /// Number of sessions holding at least one message
    async fn session_count(&self) -> Result<usize>;
}
