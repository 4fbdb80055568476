use parley_types::Provider;
use serde::Serialize;
use thiserror::Error;

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Connection refused, DNS failure, reset mid-body
    Network,
    Timeout,
    /// 401 or 403 from the provider
    Unauthorized,
    /// Any other non-2xx status
    Status,
    /// 2xx response whose body is not JSON
    MalformedBody,
    /// No API key in the request and none configured
    MissingCredentials,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
            Self::Status => "status",
            Self::MalformedBody => "malformed_body",
            Self::MissingCredentials => "missing_credentials",
        }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream failure of a single provider request
#[derive(Debug, Clone, Error)]
#[error("{provider} request failed ({kind}{}): {message}", status_suffix(.status))]
pub struct ProviderRequestError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
    /// HTTP status returned by the provider, when one was received
    pub status: Option<u16>,
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(", status {}", s)).unwrap_or_default()
}

impl ProviderRequestError {
    pub fn new(provider: Provider, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn timeout(provider: Provider, after: std::time::Duration) -> Self {
        Self::new(
            provider,
            ProviderErrorKind::Timeout,
            format!("no response within {}s", after.as_secs()),
        )
    }

    /// Classify a transport error from reqwest
    pub fn from_reqwest(provider: Provider, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ProviderErrorKind::Timeout
        } else if err.is_decode() {
            ProviderErrorKind::MalformedBody
        } else {
            ProviderErrorKind::Network
        };
        let error = Self::new(provider, kind, err.to_string());
        match err.status() {
            Some(status) => error.with_status(status.as_u16()),
            None => error,
        }
    }
}
