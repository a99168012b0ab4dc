//! Upstream language-model provider configuration.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// The closed set of upstream providers the gateway can dispatch to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderId {
    /// OpenAI chat completions.
    OpenAI,
    /// Groq's OpenAI-compatible chat completions.
    Groq,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAI, ProviderId::Groq];
}

/// LLM configuration for the generation endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider used for clients whose record does not name one.
    pub default_provider: ProviderId,
    /// Model used for clients whose record does not name one.
    pub default_model: String,
    /// Upper bound for a single upstream call.
    #[serde(deserialize_with = "duration_str::deserialize_duration")]
    pub timeout: Duration,
    /// Per-provider settings.
    pub providers: ProvidersConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderId::Groq,
            default_model: "mixtral-8x7b-32768".to_string(),
            timeout: Duration::from_secs(60),
            providers: ProvidersConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub groq: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::OpenAI => &self.openai,
            ProviderId::Groq => &self.groq,
        }
    }

    pub(crate) fn get_mut(&mut self, id: ProviderId) -> &mut ProviderConfig {
        match id {
            ProviderId::OpenAI => &mut self.openai,
            ProviderId::Groq => &mut self.groq,
        }
    }

    /// Providers that are switched on, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = (ProviderId, &ProviderConfig)> {
        ProviderId::ALL
            .into_iter()
            .map(|id| (id, self.get(id)))
            .filter(|(_, config)| config.enabled)
    }
}

/// Configuration for a single upstream provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Disabled providers are never instantiated; requests naming them are rejected.
    pub enabled: bool,
    /// API key sent as a bearer token.
    pub api_key: Option<SecretString>,
    /// Overrides the provider's public API URL.
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}
