//! Client for the OpenAI-compatible `/chat/completions` API, shared by every provider that
//! speaks it.

use std::time::Duration;

use config::{ProviderConfig, ProviderId};
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    error::LlmError,
    messages::Usage,
    provider::{ProviderError, ProviderRequest, ProviderResponse, http_client::upstream_client},
};

pub(super) struct ChatCompletionsClient {
    provider: ProviderId,
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl ChatCompletionsClient {
    pub(super) fn new(
        provider: ProviderId,
        default_base_url: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let client = upstream_client(timeout).map_err(|e| {
            log::error!("Failed to create HTTP client for {provider} provider: {e}");
            LlmError::Internal(None)
        })?;

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(default_base_url)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            provider,
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub(super) async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let provider = self.provider;

        let Some(api_key) = self.api_key.as_ref() else {
            return Err(ProviderError::MissingApiKey(provider));
        };

        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        log::debug!("Sending chat completion to {provider} with model {}", request.model);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection {
                provider,
                message: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("{provider} API error ({status}): {error_text}");

            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);

            return Err(ProviderError::Api {
                provider,
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await.map_err(|e| ProviderError::Connection {
            provider,
            message: e.to_string(),
        })?;

        let chat_response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            log::debug!("Response parsing failed, length: {} bytes", response_text.len());

            ProviderError::InvalidResponse {
                provider,
                message: e.to_string(),
            }
        })?;

        let Some(choice) = chat_response.choices.into_iter().next() else {
            return Err(ProviderError::InvalidResponse {
                provider,
                message: "response contained no choices".to_string(),
            });
        };

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            model: request.model,
            usage: chat_response.usage,
        })
    }
}
