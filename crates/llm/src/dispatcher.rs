use clients::{ClientRecord, can_use_provider};
use config::LlmConfig;

use crate::{
    error::LlmError,
    messages::{GenerateRequest, GenerateResponse},
    provider::{ProviderRequest, Providers},
};

/// Applies a client's limits and permissions to a generation request and forwards it to the
/// chosen provider.
pub struct Dispatcher {
    providers: Providers,
}

impl Dispatcher {
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        Ok(Self::new(Providers::from_config(config)?))
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Checks run in a fixed order and stop at the first failure: token ceiling, provider
    /// permission, provider availability. No provider is contacted unless all of them pass.
    pub async fn generate(&self, client: &ClientRecord, request: GenerateRequest) -> crate::Result<GenerateResponse> {
        let limit = client.max_tokens_limit.get();

        if request.max_tokens > limit {
            log::debug!(
                "Client {} asked for {} tokens, above its limit of {limit}",
                client.client_id,
                request.max_tokens
            );

            return Err(LlmError::LimitExceeded { limit });
        }

        let provider_id = request.provider.unwrap_or(client.default_provider);

        if !can_use_provider(client, provider_id) {
            log::debug!("Client {} is not allowed to use {provider_id}", client.client_id);
            return Err(LlmError::ProviderForbidden(provider_id));
        }

        let model = request.model.unwrap_or_else(|| client.default_model.clone());

        let Some(provider) = self.providers.get(provider_id) else {
            log::debug!("Provider {provider_id} is not enabled on this gateway");
            return Err(LlmError::InvalidProvider(provider_id));
        };

        log::debug!(
            "Dispatching generation for client {} to {provider_id} with model {model}",
            client.client_id
        );

        let provider_request = ProviderRequest {
            prompt: request.prompt,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            model,
        };

        let response = provider.generate(provider_request).await.map_err(|e| {
            log::error!("Error generating text with {provider_id}: {e}");
            LlmError::Upstream(e.to_string())
        })?;

        Ok(GenerateResponse {
            text: response.text,
            model: response.model,
            usage: response.usage,
        })
    }
}
