mod chat;
mod groq;
mod http_client;
mod openai;

use std::collections::BTreeMap;

use async_trait::async_trait;
use config::{LlmConfig, ProviderId};

use crate::messages::Usage;

pub use self::{groq::GroqProvider, openai::OpenAIProvider};

/// What the gateway asks of an upstream: one user prompt, one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u64,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    /// The model the gateway requested, not whatever label the upstream echoes back.
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("No API key configured for provider {0}")]
    MissingApiKey(ProviderId),

    #[error("Failed to send request to {provider}: {message}")]
    Connection { provider: ProviderId, message: String },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: ProviderId, message: String },
}

/// An upstream language-model service.
#[async_trait]
pub trait Provider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

/// The providers enabled on this gateway, keyed by id.
#[derive(Default)]
pub struct Providers {
    providers: BTreeMap<ProviderId, Box<dyn Provider>>,
}

impl Providers {
    /// Instantiates every provider enabled in the configuration.
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        let mut providers = Self::default();

        for (id, provider_config) in config.providers.enabled() {
            let provider: Box<dyn Provider> = match id {
                ProviderId::OpenAI => Box::new(OpenAIProvider::new(provider_config, config.timeout)?),
                ProviderId::Groq => Box::new(GroqProvider::new(provider_config, config.timeout)?),
            };

            log::debug!("Initialized provider {id}");
            providers.insert(provider);
        }

        Ok(providers)
    }

    /// Registers a provider, replacing any previous one with the same id.
    pub fn insert(&mut self, provider: Box<dyn Provider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn Provider> {
        self.providers.get(&id).map(|provider| provider.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.providers.keys().copied()
    }
}
