use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Completion providers known to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "azure_openai")]
    AzureOpenAI,
    Groq,
    Ollama,
    /// Computed in the client; replies are written back as external replies
    Browser,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::OpenAI,
        Provider::AzureOpenAI,
        Provider::Groq,
        Provider::Ollama,
        Provider::Browser,
    ];

    /// Wire name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::AzureOpenAI => "azure_openai",
            Self::Groq => "groq",
            Self::Ollama => "ollama",
            Self::Browser => "browser",
        }
    }

    /// Whether replies for this provider are produced outside the server
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::Browser)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
