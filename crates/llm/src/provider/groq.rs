use std::time::Duration;

use async_trait::async_trait;
use config::{ProviderConfig, ProviderId};

use super::{Provider, ProviderError, ProviderRequest, ProviderResponse, chat::ChatCompletionsClient};

/// Groq serves an OpenAI-compatible API under this prefix.
const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    chat: ChatCompletionsClient,
}

impl GroqProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> crate::Result<Self> {
        let chat = ChatCompletionsClient::new(ProviderId::Groq, DEFAULT_GROQ_API_URL, config, timeout)?;

        Ok(Self { chat })
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.chat.complete(request).await
    }
}
