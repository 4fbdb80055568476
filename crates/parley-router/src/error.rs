use parley_llm::ProviderRequestError;
use parley_persist::PersistError;
use parley_types::UnknownProvider;
use thiserror::Error;

/// Failure of a router operation, reported to the immediate caller
#[derive(Error, Debug, Clone)]
pub enum CompletionError {
    /// Bad input the caller can correct; never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider name not known, or known but not served by this process
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error(transparent)]
    ProviderRequest(#[from] ProviderRequestError),

    /// The session was cleared while its provider call was in flight
    #[error("Session {0} was cleared before the reply arrived")]
    SessionCleared(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<UnknownProvider> for CompletionError {
    fn from(err: UnknownProvider) -> Self {
        Self::UnsupportedProvider(err.0)
    }
}

impl From<PersistError> for CompletionError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Validation(msg) => Self::Validation(msg),
            PersistError::NoUserMessage(session_id) => Self::Validation(format!(
                "session {} has no user message to reply to",
                session_id
            )),
            PersistError::Backend(msg) => Self::Storage(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompletionError>;
