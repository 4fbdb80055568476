pub mod azure_openai;
pub mod config;
pub mod error;
pub mod openai;
pub mod registry;
pub mod traits;
pub mod wire;

pub use azure_openai::AzureOpenAIClient;
pub use config::{AzureConfig, OpenAIConfig, ProviderSettings};
pub use error::{ProviderErrorKind, ProviderRequestError};
pub use openai::{AuthScheme, OpenAIClient};
pub use registry::ProviderRegistry;
pub use traits::{ChatTurn, Credentials, ProviderAdapter, ProviderReply, TokenUsage};
