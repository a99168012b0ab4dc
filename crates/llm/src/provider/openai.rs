use std::time::Duration;

use async_trait::async_trait;
use config::{ProviderConfig, ProviderId};

use super::{Provider, ProviderError, ProviderRequest, ProviderResponse, chat::ChatCompletionsClient};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIProvider {
    chat: ChatCompletionsClient,
}

impl OpenAIProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> crate::Result<Self> {
        let chat = ChatCompletionsClient::new(ProviderId::OpenAI, DEFAULT_OPENAI_API_URL, config, timeout)?;

        Ok(Self { chat })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    async fn generate(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.chat.complete(request).await
    }
}
