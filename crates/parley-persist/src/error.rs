use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// An assistant message was pushed to a session without a user message
    #[error("Session {0} has no user message to reply to")]
    NoUserMessage(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
