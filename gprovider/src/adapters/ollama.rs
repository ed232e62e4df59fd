//! Ollama provider implemented over OpenAI-compatible transport.

use std::sync::Arc;

use reqwest::Client;

use crate::adapters::openai::{OpenAiAuth, OpenAiHttpTransport, OpenAiRequest, OpenAiTransport};
use crate::{ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

#[derive(Clone)]
pub struct OllamaProvider {
    transport: Arc<dyn OpenAiTransport>,
}

impl OllamaProvider {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self { transport }
    }

    /// Transport for an Ollama server; `base_url` is its OpenAI-compatible root.
    pub fn http_transport(client: Client, base_url: impl Into<String>) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client).with_base_url(base_url)
    }
}

impl ModelProvider for OllamaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let response = self
                .transport
                .complete(OpenAiRequest::from(request), OpenAiAuth::Anonymous)
                .await?;
            response.into_model_response(ProviderId::Ollama)
        })
    }
}
