mod clients;
mod error;
mod llm;
mod loader;
mod server;

use std::path::Path;

use serde::Deserialize;

pub use clients::ClientsConfig;
pub use error::Error;
pub use llm::{LlmConfig, ProviderConfig, ProviderId, ProvidersConfig};
pub use server::{CorsConfig, ServerConfig, TlsConfig};

pub type Result<T> = std::result::Result<T, error::Error>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub clients: ClientsConfig,
}

impl Config {
    /// Loads the configuration from a TOML file, then applies environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }

    /// Builds the configuration from defaults and environment variables only.
    pub fn from_env() -> crate::Result<Config> {
        loader::from_env()
    }
}
