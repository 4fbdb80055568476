use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_REPLY_TOKENS: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_max_reply_tokens() -> u32 {
    DEFAULT_MAX_REPLY_TOKENS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_serialize_sessions() -> bool {
    true
}

/// Operator-level completion limits; callers never choose these
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Reply length ceiling sent to every provider
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,
    /// Ceiling on a single provider call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Run each session's turns one at a time
    #[serde(default = "default_serialize_sessions")]
    pub serialize_sessions: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_reply_tokens: DEFAULT_MAX_REPLY_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            serialize_sessions: true,
        }
    }
}

impl RouterConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
