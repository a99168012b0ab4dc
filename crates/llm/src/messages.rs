//! Request and response bodies of the generation endpoint.

use config::ProviderId;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u64 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Sampling temperature in `[0, 1]`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    /// Falls back to the client's default provider.
    #[serde(default)]
    pub provider: Option<ProviderId>,
    /// Falls back to the client's default model.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u64 {
    DEFAULT_MAX_TOKENS
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            provider: None,
            model: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LlmError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(LlmError::InvalidRequest(format!(
                "temperature must be between 0 and 1, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(LlmError::InvalidRequest("max_tokens must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub usage: Option<Usage>,
}

/// Token accounting as reported by the upstream provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}
