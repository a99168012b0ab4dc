use std::{collections::BTreeSet, num::NonZeroU64};

use config::ProviderId;
use serde::Deserialize;

/// Gateway-wide fallbacks for records that leave their defaults out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDefaults {
    pub provider: ProviderId,
    pub model: String,
}

impl From<&config::LlmConfig> for ClientDefaults {
    fn from(config: &config::LlmConfig) -> Self {
        Self {
            provider: config.default_provider,
            model: config.default_model.clone(),
        }
    }
}

/// Per-client limits. Recorded for operators only; nothing enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimit {
    pub requests_per_minute: NonZeroU64,
    pub tokens_per_day: NonZeroU64,
}

/// A registered client and everything it is allowed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    /// Hex SHA-256 of the shared secret, compared byte for byte with `hash_secret` output, so
    /// only lowercase hex can match. A record without one never authenticates.
    pub client_secret_hash: Option<String>,
    pub allowed_providers: BTreeSet<ProviderId>,
    pub default_provider: ProviderId,
    pub default_model: String,
    pub max_tokens_limit: NonZeroU64,
    pub rate_limit: RateLimit,
    pub allowed_endpoints: BTreeSet<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
struct RecordFile {
    client_id: String,
    name: String,
    #[serde(default)]
    client_secret_hash: Option<String>,
    allowed_providers: BTreeSet<ProviderId>,
    #[serde(default)]
    default_provider: Option<ProviderId>,
    #[serde(default)]
    default_model: Option<String>,
    max_tokens_limit: NonZeroU64,
    rate_limit: RateLimit,
    allowed_endpoints: BTreeSet<String>,
    created_at: String,
    updated_at: String,
}

impl ClientRecord {
    /// Parses one client configuration document.
    pub fn from_json(json: &str, defaults: &ClientDefaults) -> serde_json::Result<Self> {
        let file: RecordFile = serde_json::from_str(json)?;

        let client_secret_hash = file
            .client_secret_hash
            .filter(|hash| !hash.is_empty());

        Ok(Self {
            client_id: file.client_id,
            name: file.name,
            client_secret_hash,
            allowed_providers: file.allowed_providers,
            default_provider: file.default_provider.unwrap_or(defaults.provider),
            default_model: file.default_model.unwrap_or_else(|| defaults.model.clone()),
            max_tokens_limit: file.max_tokens_limit,
            rate_limit: file.rate_limit,
            allowed_endpoints: file.allowed_endpoints,
            created_at: file.created_at,
            updated_at: file.updated_at,
        })
    }
}
