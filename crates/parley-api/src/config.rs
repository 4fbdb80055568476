use config::{Config as ConfigLoader, ConfigError, Environment, File};
use parley_llm::ProviderSettings;
use parley_router::RouterConfig;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub completion: RouterConfig,
    #[serde(default)]
    pub providers: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. PARLEY_* environment variables, `__` between levels
    ///    (e.g. PARLEY_SERVER__PORT=8080)
    /// 4. Provider API keys from their own variables (never from TOML)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.apply_secrets(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        config.try_deserialize()
    }

    /// Attach provider keys. A key for a provider with no table enables it
    /// with defaults; Azure additionally needs its table for the endpoint.
    pub fn apply_secrets(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let providers = &mut self.providers;

        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            providers.openai.get_or_insert_with(Default::default).api_key = Some(key);
        }
        if let Some(key) = lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()) {
            providers.groq.get_or_insert_with(Default::default).api_key = Some(key);
        }
        if let Some(key) = lookup("AZURE_OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            match providers.azure_openai.as_mut() {
                Some(azure) => azure.api_key = Some(key),
                None => tracing::warn!("AZURE_OPENAI_API_KEY set but [providers.azure_openai] is not configured"),
            }
        }
    }
}
