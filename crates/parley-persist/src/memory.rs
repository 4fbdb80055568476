use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parley_types::Message;

use crate::backend::TranscriptBackend;
use crate::error::{PersistError, Result};

/// In-process backend keyed by session id.
///
/// `DashMap` shards its entries, so operations on different sessions do not
/// wait on each other. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: DashMap<String, Vec<Message>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptBackend for MemoryBackend {
    async fn push(&self, mut message: Message) -> Result<Message> {
        // The entry guard holds the shard lock until the message is in place
        match self.sessions.entry(message.session_id.clone()) {
            Entry::Occupied(mut entry) => {
                // A session's first message is always a user message
                let messages = entry.get_mut();
                if let Some(previous) = messages.last() {
                    if previous.timestamp > message.timestamp {
                        message.timestamp = previous.timestamp;
                    }
                }
                messages.push(message.clone());
            }
            Entry::Vacant(entry) => {
                if message.is_assistant() {
                    return Err(PersistError::NoUserMessage(message.session_id));
                }
                entry.insert(vec![message.clone()]);
            }
        }
        Ok(message)
    }

    async fn load(&self, session_id: &str) -> Result<Vec<Message>> {
        Ok(self
            .sessions
            .get(session_id)
            .map(|messages| messages.value().clone())
            .unwrap_or_default())
    }

    async fn remove(&self, session_id: &str) -> Result<()> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.len())
    }
}
